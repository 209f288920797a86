//! Config loader — reads `~/.opsbot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.opsbot/config.json`
//! 3. Environment variables `OPSBOT_<SECTION>__<FIELD>`
//! 4. Short compatibility variables (`LLM_MODEL`, `LLM_API_KEY`, ...)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Provider name the `LLM_PROVIDER=local` alias maps to.
const LOCAL_PROVIDER: &str = "ollama";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path (or `path`) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path);
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` is the variable source (`std::env::var` in production).
///
/// Supported overrides:
/// - `OPSBOT_AGENT__PROVIDER`, `OPSBOT_AGENT__MODEL`, `OPSBOT_AGENT__MAX_TOKENS`,
///   `OPSBOT_AGENT__TEMPERATURE`, `OPSBOT_AGENT__MAX_VERIFIER_RETRIES`
/// - `OPSBOT_PROVIDERS__<NAME>__API_KEY`, `OPSBOT_PROVIDERS__<NAME>__API_BASE`
/// - `OPSBOT_TOOLS__GITHUB__TOKEN`
/// - `LLM_PROVIDER` (`local` → `ollama`), `LLM_MODEL`, `LLM_API_KEY`, `LLM_BASE_URL`,
///   `MAX_VERIFIER_RETRIES`, `GITHUB_TOKEN`
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    // Agent
    if let Some(val) = lookup("OPSBOT_AGENT__PROVIDER") {
        config.agent.provider = Some(val);
    }
    if let Some(val) = lookup("OPSBOT_AGENT__MODEL") {
        config.agent.model = val;
    }
    if let Some(n) = lookup("OPSBOT_AGENT__MAX_TOKENS").and_then(|v| v.parse().ok()) {
        config.agent.max_tokens = n;
    }
    if let Some(t) = lookup("OPSBOT_AGENT__TEMPERATURE").and_then(|v| v.parse().ok()) {
        config.agent.temperature = t;
    }
    if let Some(n) = lookup("OPSBOT_AGENT__MAX_VERIFIER_RETRIES").and_then(|v| v.parse().ok()) {
        config.agent.max_verifier_retries = n;
    }

    // Providers
    for name in ["OPENAI", "OPENROUTER", "DEEPSEEK", "GROQ", "OLLAMA", "VLLM"] {
        let Some(provider) = config.providers.get_by_name_mut(&name.to_lowercase()) else {
            continue;
        };
        if let Some(val) = lookup(&format!("OPSBOT_PROVIDERS__{name}__API_KEY")) {
            provider.api_key = val;
        }
        if let Some(val) = lookup(&format!("OPSBOT_PROVIDERS__{name}__API_BASE")) {
            provider.api_base = Some(val);
        }
    }

    // Tools
    if let Some(val) = lookup("OPSBOT_TOOLS__GITHUB__TOKEN") {
        config.tools.github.token = Some(val);
    }

    apply_compat_env(config, &lookup)
}

/// Short variable names: `LLM_*`, `MAX_VERIFIER_RETRIES`, `GITHUB_TOKEN`.
fn apply_compat_env<F>(mut config: Config, lookup: &F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("LLM_PROVIDER") {
        let name = if val == "local" { LOCAL_PROVIDER.to_string() } else { val };
        config.agent.provider = Some(name);
    }
    if let Some(val) = lookup("LLM_MODEL") {
        config.agent.model = val;
    }
    if let Some(val) = lookup("MAX_VERIFIER_RETRIES") {
        match val.parse() {
            Ok(n) => config.agent.max_verifier_retries = n,
            Err(_) => warn!(value = %val, "ignoring invalid MAX_VERIFIER_RETRIES"),
        }
    }

    // LLM_API_KEY / LLM_BASE_URL target the selected provider.
    let target = config
        .agent
        .provider
        .clone()
        .unwrap_or_else(|| LOCAL_PROVIDER.to_string());
    if let Some(provider) = config.providers.get_by_name_mut(&target) {
        if let Some(val) = lookup("LLM_API_KEY") {
            provider.api_key = val;
        }
        if let Some(val) = lookup("LLM_BASE_URL") {
            provider.api_base = Some(val);
        }
    } else if lookup("LLM_API_KEY").is_some() || lookup("LLM_BASE_URL").is_some() {
        warn!(provider = %target, "LLM_API_KEY/LLM_BASE_URL set for unknown provider");
    }

    if config.tools.github.token.is_none() {
        config.tools.github.token = lookup("GITHUB_TOKEN");
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
