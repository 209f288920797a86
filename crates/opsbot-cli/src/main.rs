//! Opsbot CLI — entry point.
//!
//! - `opsbot --task "..."` — run one request and exit
//! - `echo "..." | opsbot` — run the piped request and exit
//! - `opsbot` — interactive REPL
//! - `opsbot --init-config` — write a default config file

mod helpers;
mod repl;

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use opsbot_agent::{default_registry, ControlLoop};
use opsbot_core::config::{get_config_path, load_config, save_config, Config};
use opsbot_providers::{create_provider, LlmProvider, StructuredClient};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Opsbot — plan, execute and verify tool-backed requests
#[derive(Parser)]
#[command(name = "opsbot", version, about, long_about = None)]
struct Cli {
    /// Run a single task non-interactively and exit.
    #[arg(long)]
    task: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,

    /// Config file (default: ~/.opsbot/config.json)
    #[arg(long)]
    config: Option<String>,

    /// Write a default config file and exit
    #[arg(long, default_value_t = false)]
    init_config: bool,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref().map(helpers::expand_tilde);

    if cli.init_config {
        return init_config(config_path.as_deref());
    }

    println!("Initializing Opsbot...");
    let config = load_config(config_path.as_deref());
    let app = App::build(&config).context("initialization failed")?;
    helpers::print_ready(&app.provider, &app.model, app.control.max_retries());

    if let Some(task) = cli.task {
        return app.run_once(task.trim()).await;
    }

    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let mut piped = String::new();
        stdin
            .lock()
            .read_to_string(&mut piped)
            .context("failed to read stdin")?;
        let piped = piped.trim();
        if !piped.is_empty() {
            app.run_once(piped).await?;
        }
        return Ok(());
    }

    repl::run(&app).await
}

// ─────────────────────────────────────────────
// Application
// ─────────────────────────────────────────────

/// A ready-to-use control loop plus what to show about it.
pub struct App {
    control: ControlLoop,
    provider: String,
    model: String,
}

impl App {
    /// Build provider, tools and control loop from the loaded configuration.
    pub fn build(config: &Config) -> Result<Self> {
        let agent = &config.agent;

        let providers_map = config.providers.to_map();
        let provider = create_provider(agent.provider.as_deref(), &agent.model, &providers_map)
            .map_err(|e| anyhow::anyhow!(e))?;
        let provider_name = provider.display_name().to_string();

        let llm = StructuredClient::new(Arc::new(provider), Some(agent.model.clone()))
            .with_max_tokens(agent.max_tokens)
            .with_temperature(agent.temperature);
        let model = llm.model().to_string();

        let tools = Arc::new(default_registry(&config.tools));
        info!(tools = tools.len(), provider = %provider_name, model = %model, "opsbot ready");

        let control = ControlLoop::from_llm(llm, tools, agent.max_verifier_retries).with_observer(
            Arc::new(helpers::ConsoleObserver::new(agent.max_verifier_retries)),
        );

        Ok(Self {
            control,
            provider: provider_name,
            model,
        })
    }

    /// Handle one request and print the final response.
    pub async fn run_once(&self, query: &str) -> Result<()> {
        println!("\n[Planner] Generating plan...");
        let outcome = self.control.run(query).await.context("request failed")?;
        helpers::print_final_response(&outcome.verification);
        Ok(())
    }
}

/// Write the default configuration unless a file already exists.
fn init_config(path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    save_config(&Config::default(), Some(&path))
        .with_context(|| format!("failed to write config to {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Initialize tracing/logging. Logs go to stderr so stdout stays readable.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("opsbot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
