//! Tool modules for the Opsbot executor.

pub mod base;
pub mod github;
pub mod registry;
pub mod weather;

use std::sync::Arc;

use opsbot_core::config::ToolsConfig;

pub use base::{optional_i64, optional_string, require_string, Tool};
pub use github::{GithubClient, GithubContentTool, GithubSearchTool};
pub use registry::ToolRegistry;
pub use weather::WeatherTool;

/// Registry with the built-in tools: `github_search`, `github_content`, `get_weather`.
pub fn default_registry(config: &ToolsConfig) -> ToolRegistry {
    let github = GithubClient::new(&config.github);

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GithubSearchTool::new(github.clone())));
    registry.register(Arc::new(GithubContentTool::new(github)));
    registry.register(Arc::new(WeatherTool::new(&config.weather)));
    registry
}
