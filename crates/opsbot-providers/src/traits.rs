//! LLM Provider trait — the completion-service abstraction.
//!
//! Every OpenAI-compatible backend (OpenAI, OpenRouter, DeepSeek, Groq, Ollama,
//! vLLM) is served by `HttpProvider`; tests plug in canned providers.

use async_trait::async_trait;
use opsbot_core::types::{LlmResponse, Message, ResponseFormat};

use crate::error::LlmError;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Ask the backend for a specific output format (JSON mode).
    pub response_format: Option<ResponseFormat>,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.0,
            response_format: None,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` — Prompt in OpenAI format.
    /// * `model`    — Model identifier (e.g. `"gpt-4o-mini"`, `"llama3"`).
    /// * `config`   — Temperature, max_tokens, response format.
    ///
    /// Transport failures, non-2xx statuses and unparsable envelopes are
    /// returned as `LlmError`.
    async fn chat(
        &self,
        messages: &[Message],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, LlmError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
