//! Scripted language model for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use opsbot_core::types::{LlmResponse, Message};
use opsbot_providers::{LlmError, LlmProvider, LlmRequestConfig, StructuredClient};
use serde_json::Value;

/// Replies with queued completions in order and records every prompt.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(replies: impl IntoIterator<Item = Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|v| v.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn raw(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Concatenated text of every message of the `n`th call.
    pub fn prompt_text(&self, n: usize) -> String {
        self.prompts.lock().unwrap()[n]
            .iter()
            .filter_map(Message::content)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn client(self: &Arc<Self>) -> StructuredClient {
        StructuredClient::new(self.clone(), None)
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        _model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(text) => Ok(LlmResponse::text(text)),
            None => Err(LlmError::InvalidResponse("script exhausted".into())),
        }
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "Scripted"
    }
}
