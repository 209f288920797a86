//! Core types for Opsbot — the OpenAI chat completions wire format.
//!
//! Planner and verifier prompts are plain role/content messages; the provider
//! layer serializes these directly into `/chat/completions` request bodies.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Each variant maps to a `role` field value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: String },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
        }
    }

    /// Whether this is a system message.
    pub fn is_system(&self) -> bool {
        matches!(self, Message::System { .. })
    }

    /// Text content of the message, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content),
            Message::Assistant { content } => content.as_deref(),
        }
    }
}

// ─────────────────────────────────────────────
// Tool Definitions (shown to the planner)
// ─────────────────────────────────────────────

/// Machine-readable description of a tool: `{"type": "function", "function": {...}}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    /// The function schema.
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Response format
// ─────────────────────────────────────────────

/// `response_format` request field. Only JSON-object mode is used.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// `{"type": "json_object"}`
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// Response from an LLM provider after a chat completion call.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Text content from the assistant.
    pub content: Option<String>,
    /// Why the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage statistics.
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// A plain text response, mostly useful for mocks.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Provider-related types
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Take the first choice. `None` when the API returned no choices.
    pub fn into_llm_response(self) -> Option<LlmResponse> {
        let usage = self.usage;
        self.choices.into_iter().next().map(|c| LlmResponse {
            content: c.message.content,
            finish_reason: c.finish_reason,
            usage,
        })
    }
}

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
