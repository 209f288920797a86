//! Generic HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint: OpenAI, OpenRouter,
//! DeepSeek, Groq, and local Ollama / vLLM servers.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use opsbot_core::types::{ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message};

use crate::error::LlmError;
use crate::registry::{match_provider, ProviderConfig, ProviderSpec};
use crate::traits::{LlmProvider, LlmRequestConfig};

/// Client-side request timeout.
const REQUEST_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A generic LLM provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication. Empty for local servers.
    api_key: String,
    /// Default model for this provider instance.
    default_model: String,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
    /// Provider spec this instance was built from.
    spec: &'static ProviderSpec,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("provider", &self.spec.display_name)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider from a provider config and spec.
    ///
    /// # Arguments
    /// * `config`  — User's config (api_key, api_base, extra_headers)
    /// * `spec`    — Static provider spec from the registry
    /// * `model`   — The default model to use
    pub fn new(config: &ProviderConfig, spec: &'static ProviderSpec, model: &str) -> Self {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| spec.default_api_base.to_string());

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            extra_headers,
            spec,
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, LlmError> {
        debug!(
            provider = self.spec.display_name,
            model = %model,
            messages = messages.len(),
            json_mode = config.response_format.is_some(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
            response_format: config.response_format.clone(),
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .headers(self.extra_headers.clone())
            .json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = self.spec.display_name, error = %e, "HTTP request failed");
            LlmError::Http(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                provider = self.spec.display_name,
                status = %status,
                body = %body,
                "API error"
            );
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_resp = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(
                provider = self.spec.display_name,
                error = %e,
                "Failed to parse LLM response"
            );
            LlmError::InvalidResponse(e.to_string())
        })?;

        let llm_resp = chat_resp
            .into_llm_response()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".into()))?;

        debug!(
            provider = self.spec.display_name,
            has_content = llm_resp.content.is_some(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        self.spec.display_name
    }
}

// ─────────────────────────────────────────────
// Builder (convenience)
// ─────────────────────────────────────────────

/// Build an HttpProvider from an optional provider name, a model, and the
/// configured provider map.
pub fn create_provider(
    provider_name: Option<&str>,
    model: &str,
    providers: &HashMap<String, ProviderConfig>,
) -> Result<HttpProvider, String> {
    let (config, spec) = match_provider(provider_name, model, providers).ok_or_else(|| {
        match provider_name {
            Some(name) => format!(
                "Provider '{}' is unknown or has no API key configured \
                 (set LLM_API_KEY or OPSBOT_PROVIDERS__{}__API_KEY).",
                name,
                name.to_uppercase()
            ),
            None => format!("No configured provider found for model '{}'.", model),
        }
    })?;

    debug!(
        provider = spec.display_name,
        model = model,
        api_base = config.api_base.as_deref().unwrap_or(spec.default_api_base),
        "Creating LLM provider"
    );

    Ok(HttpProvider::new(&config, spec, model))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use opsbot_core::types::ResponseFormat;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            extra_headers: None,
        }
    }

    #[test]
    fn test_completions_url_trailing_slash() {
        let spec = find_by_name("openai").unwrap();
        let config = make_config("key", Some("https://api.openai.com/v1/"));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base_for_local() {
        let spec = find_by_name("ollama").unwrap();
        let provider = HttpProvider::new(&ProviderConfig::default(), spec, "llama3");
        assert_eq!(provider.api_base, "http://localhost:11434/v1");
    }

    #[test]
    fn test_config_overrides_default_base() {
        let spec = find_by_name("openrouter").unwrap();
        let config = make_config("sk-or-abc", Some("https://custom.proxy.com/v1"));
        let provider = HttpProvider::new(&config, spec, "meta-llama/llama-3");
        assert_eq!(provider.api_base, "https://custom.proxy.com/v1");
    }

    #[test]
    fn test_extra_headers() {
        let spec = find_by_name("openrouter").unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Title".to_string(), "opsbot".to_string());
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: None,
            extra_headers: Some(headers),
        };
        let provider = HttpProvider::new(&config, spec, "gpt-4o");
        assert!(provider.extra_headers.contains_key("x-title"));
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "{\"steps\": []}" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            })))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("openai").unwrap();
        let config = make_config("test-key-123", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let messages = vec![Message::system("Output JSON."), Message::user("Plan")];
        let resp = provider
            .chat(&messages, "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(resp.content.as_deref(), Some("{\"steps\": []}"));
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_sends_json_mode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "temperature": 0.0,
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "{}" }, "finish_reason": "stop" }]
            })))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("ollama").unwrap();
        let config = make_config("", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "llama3");

        let req_config = LlmRequestConfig {
            response_format: Some(ResponseFormat::json_object()),
            ..Default::default()
        };
        let resp = provider
            .chat(&[Message::user("x")], "llama3", &req_config)
            .await
            .unwrap();

        // If the body matcher fails, wiremock returns 404 → we'd get an error
        assert_eq!(resp.content.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let spec = find_by_name("openai").unwrap();
        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let err = provider
            .chat(&[Message::user("Hello")], "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        match err {
            LlmError::Api { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let spec = find_by_name("openai").unwrap();
        let config = make_config("key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let err = provider
            .chat(&[Message::user("Hello")], "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        // Point to a port that's not listening
        let spec = find_by_name("openai").unwrap();
        let config = make_config("key", Some("http://127.0.0.1:1"));
        let provider = HttpProvider::new(&config, spec, "gpt-4o");

        let err = provider
            .chat(&[Message::user("Hello")], "gpt-4o", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
        assert!(err.to_string().contains("error calling LLM"));
    }

    #[test]
    fn test_create_provider_local_default() {
        let provider = create_provider(None, "llama3", &HashMap::new()).unwrap();
        assert_eq!(provider.display_name(), "Ollama");
        assert_eq!(provider.default_model(), "llama3");
    }

    #[test]
    fn test_create_provider_missing_key() {
        let err = create_provider(Some("openai"), "gpt-4o", &HashMap::new()).unwrap_err();
        assert!(err.contains("openai"));
        assert!(err.contains("OPSBOT_PROVIDERS__OPENAI__API_KEY"));
    }
}
