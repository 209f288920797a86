//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use opsbot_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.agent.model);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{apply_env_overrides, get_config_path, load_config, save_config};
pub use schema::{AgentConfig, Config, GithubConfig, ProviderConfig, ToolsConfig, WeatherConfig};
