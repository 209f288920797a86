//! Provider registry — static specs for the supported OpenAI-compatible backends.
//!
//! Each `ProviderSpec` describes how to reach a provider: keywords for model
//! matching, display name, default API base, and whether it is a gateway or a
//! local server.

use std::collections::HashMap;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openrouter"`). Matches the config key.
    pub name: &'static str,
    /// Keywords to match in model names (lowercase).
    pub keywords: &'static [&'static str],
    /// Human-readable name for logs.
    pub display_name: &'static str,
    /// Whether this is a gateway/aggregator (OpenRouter).
    /// Gateways are used as fallback when no direct match is found.
    pub is_gateway: bool,
    /// Whether this is a local/self-hosted server that needs no API key.
    pub is_local: bool,
    /// Default API base URL.
    pub default_api_base: &'static str,
}

/// Supported providers, in matching priority order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "openrouter",
        keywords: &["openrouter"],
        display_name: "OpenRouter",
        is_gateway: true,
        is_local: false,
        default_api_base: "https://openrouter.ai/api/v1",
    },
    ProviderSpec {
        name: "openai",
        keywords: &["openai", "gpt"],
        display_name: "OpenAI",
        is_gateway: false,
        is_local: false,
        default_api_base: "https://api.openai.com/v1",
    },
    ProviderSpec {
        name: "deepseek",
        keywords: &["deepseek"],
        display_name: "DeepSeek",
        is_gateway: false,
        is_local: false,
        default_api_base: "https://api.deepseek.com/v1",
    },
    ProviderSpec {
        name: "groq",
        keywords: &["groq"],
        display_name: "Groq",
        is_gateway: false,
        is_local: false,
        default_api_base: "https://api.groq.com/openai/v1",
    },
    ProviderSpec {
        name: "vllm",
        keywords: &["vllm"],
        display_name: "vLLM",
        is_gateway: false,
        is_local: true,
        default_api_base: "http://localhost:8000/v1",
    },
    // Last resort: a local Ollama server.
    ProviderSpec {
        name: "ollama",
        keywords: &["ollama"],
        display_name: "Ollama",
        is_gateway: false,
        is_local: true,
        default_api_base: "http://localhost:11434/v1",
    },
];

/// Name of the provider used when nothing else matches.
pub const FALLBACK_PROVIDER: &str = "ollama";

// ─────────────────────────────────────────────
// Matching functions
// ─────────────────────────────────────────────

/// Find a provider spec by matching keywords against a model name.
///
/// Skips gateways and local providers — those are fallback only.
pub fn find_by_model(model: &str) -> Option<&'static ProviderSpec> {
    let model_lower = model.to_lowercase();
    PROVIDERS.iter().find(|spec| {
        !spec.is_gateway
            && !spec.is_local
            && spec.keywords.iter().any(|kw| model_lower.contains(kw))
    })
}

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

/// Re-export the provider config from core — single source of truth.
pub use opsbot_core::config::schema::ProviderConfig;

/// Pick the provider for a model.
///
/// 1. An explicit provider name always wins (local servers need no key).
/// 2. Keyword match on the model, only if that provider has an API key.
/// 3. First configured gateway.
/// 4. The local Ollama server.
///
/// Returns `None` only when an explicit name is unknown or names a remote
/// provider without an API key.
pub fn match_provider(
    explicit: Option<&str>,
    model: &str,
    providers: &HashMap<String, ProviderConfig>,
) -> Option<(ProviderConfig, &'static ProviderSpec)> {
    let config_for = |spec: &ProviderSpec| providers.get(spec.name).cloned().unwrap_or_default();

    if let Some(name) = explicit {
        let spec = find_by_name(name)?;
        let config = config_for(spec);
        return (spec.is_local || config.is_configured()).then_some((config, spec));
    }

    if let Some(spec) = find_by_model(model) {
        let config = config_for(spec);
        if config.is_configured() {
            return Some((config, spec));
        }
    }

    if let Some(spec) = PROVIDERS
        .iter()
        .filter(|s| s.is_gateway)
        .find(|s| config_for(s).is_configured())
    {
        return Some((config_for(spec), spec));
    }

    let spec = find_by_name(FALLBACK_PROVIDER)?;
    Some((config_for(spec), spec))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
