//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProvidersConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.opsbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub providers: ProvidersConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Planner/verifier model settings and the verifier retry bound.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Explicit provider name (e.g. `"openai"`, `"ollama"`). `None` means
    /// pick one from the model name and the configured keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// LLM model identifier.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature for structured output.
    pub temperature: f64,
    /// How many verifier-proposed retry plans may run per request.
    pub max_verifier_retries: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: "llama3".to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            max_verifier_retries: 2,
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Configuration for a single LLM provider (API key, base URL, headers).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default)]
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// All provider configurations, one per supported backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub openrouter: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub groq: ProviderConfig,
    pub ollama: ProviderConfig,
    pub vllm: ProviderConfig,
}

impl ProvidersConfig {
    /// Get a provider config by name (e.g. `"openai"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderConfig> {
        match name {
            "openai" => Some(&self.openai),
            "openrouter" => Some(&self.openrouter),
            "deepseek" => Some(&self.deepseek),
            "groq" => Some(&self.groq),
            "ollama" => Some(&self.ollama),
            "vllm" => Some(&self.vllm),
            _ => None,
        }
    }

    /// Mutable lookup by name.
    pub fn get_by_name_mut(&mut self, name: &str) -> Option<&mut ProviderConfig> {
        match name {
            "openai" => Some(&mut self.openai),
            "openrouter" => Some(&mut self.openrouter),
            "deepseek" => Some(&mut self.deepseek),
            "groq" => Some(&mut self.groq),
            "ollama" => Some(&mut self.ollama),
            "vllm" => Some(&mut self.vllm),
            _ => None,
        }
    }

    /// Convert to a name-keyed map for the provider registry.
    pub fn to_map(&self) -> HashMap<String, ProviderConfig> {
        let entries: &[(&str, &ProviderConfig)] = &[
            ("openai", &self.openai),
            ("openrouter", &self.openrouter),
            ("deepseek", &self.deepseek),
            ("groq", &self.groq),
            ("ollama", &self.ollama),
            ("vllm", &self.vllm),
        ];
        entries
            .iter()
            .map(|(name, config)| (name.to_string(), (*config).clone()))
            .collect()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Settings for the built-in HTTP tools.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub weather: WeatherConfig,
    pub github: GithubConfig,
}

/// Open-Meteo endpoints used by `get_weather`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherConfig {
    pub geocoding_base: String,
    pub forecast_base: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_base: "https://geocoding-api.open-meteo.com".to_string(),
            forecast_base: "https://api.open-meteo.com".to_string(),
            timeout_secs: 15,
        }
    }
}

/// GitHub REST API settings used by `github_search` / `github_content`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GithubConfig {
    pub api_base: String,
    /// Optional personal access token; raises the anonymous rate limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}
