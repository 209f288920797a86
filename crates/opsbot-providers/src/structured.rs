//! Structured output — force a provider to return one JSON object matching a schema.
//!
//! The schema travels as a prompt hint plus JSON mode; it is not validated
//! locally. Models that wrap the object in prose or fences are handled by
//! extracting the first balanced `{...}` span.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use opsbot_core::types::{Message, ResponseFormat};
use opsbot_core::utils::truncate_string;

use crate::error::LlmError;
use crate::traits::{LlmProvider, LlmRequestConfig};

/// System message inserted when the caller's prompt does not start with one.
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Output only valid JSON.";

/// A provider + model pair that speaks JSON objects.
#[derive(Clone)]
pub struct StructuredClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl StructuredClient {
    /// Wrap `provider`. `model` falls back to the provider's default.
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model,
            max_tokens: LlmRequestConfig::default().max_tokens,
            temperature: 0.0,
        }
    }

    /// Override the token budget for each call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the sampling temperature (0.0 unless configured).
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// The model every call is sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Display name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.display_name()
    }

    /// Ask the model for a single JSON object conforming to `schema`.
    ///
    /// The caller's messages are not mutated. A call error, unparsable text, or a
    /// non-object JSON value is returned as `LlmError`.
    pub async fn structured_output(
        &self,
        messages: &[Message],
        schema: &Value,
    ) -> Result<serde_json::Map<String, Value>, LlmError> {
        let msgs = with_schema_hint(messages, schema);

        let config = LlmRequestConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self.provider.chat(&msgs, &self.model, &config).await?;
        let content = response.content.unwrap_or_default();

        match parse_json_object(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(LlmError::NotAnObject(json_kind(&other))),
        }
    }
}

/// Copy `messages`, make sure the first one is a system message, and append
/// the schema instruction.
fn with_schema_hint(messages: &[Message], schema: &Value) -> Vec<Message> {
    let mut msgs = Vec::with_capacity(messages.len() + 2);
    if !messages.first().is_some_and(Message::is_system) {
        msgs.push(Message::system(DEFAULT_SYSTEM_PROMPT));
    }
    msgs.extend_from_slice(messages);

    // serde_json's compact form keeps the hint short.
    msgs.push(Message::system(format!(
        "Return a single JSON object that matches this JSON Schema exactly. \
         Do not include markdown, prose, or code fences.\nSCHEMA:{}",
        schema
    )));
    msgs
}

/// Parse `content` as JSON, falling back to its first balanced object.
fn parse_json_object(content: &str) -> Result<Value, LlmError> {
    match serde_json::from_str(content) {
        Ok(value) => Ok(value),
        Err(_) => {
            let extracted = extract_first_json_object(content);
            debug!(
                extracted_len = extracted.len(),
                "direct JSON parse failed, retrying on extracted object"
            );
            serde_json::from_str(extracted).map_err(|source| {
                warn!(
                    error = %source,
                    content = %truncate_string(content, 200),
                    "structured output is not valid JSON"
                );
                LlmError::Json {
                    source,
                    content: content.to_string(),
                }
            })
        }
    }
}

/// Return the first top-level `{...}` span in `text`.
///
/// Braces are counted by depth; braces inside JSON string literals (including
/// escaped quotes) do not count. With no `{` the input is returned unchanged;
/// an unterminated object returns everything from the first `{`.
pub fn extract_first_json_object(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return text;
    };

    let mut depth = 0usize;
    let mut in_str = false;
    let mut escape = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_str {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_str = false;
            }
            continue;
        }
        match ch {
            '"' => in_str = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[start..start + offset + 1];
                }
            }
            _ => {}
        }
    }

    &text[start..]
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
