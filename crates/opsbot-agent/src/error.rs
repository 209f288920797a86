//! Errors that end a control-loop run.
//!
//! Step-level problems (unknown tool, tool failure, unresolved placeholder)
//! never show up here; they are recorded in the execution trace instead.

use opsbot_providers::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The language-model call itself failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The model returned a JSON object that is not a plan / verification.
    #[error("malformed {stage} response: {source}")]
    MalformedResponse {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl AgentError {
    pub(crate) fn malformed(stage: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::MalformedResponse { stage, source }
    }
}
