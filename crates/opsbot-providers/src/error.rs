//! Errors raised at the language-model boundary.

use thiserror::Error;

/// Failure of a chat completion or structured-output call.
///
/// Every variant is fatal to the planner/verifier call that produced it.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("error calling LLM: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("structured output is not valid JSON: {source}")]
    Json {
        #[source]
        source: serde_json::Error,
        /// The raw completion text, kept for logging.
        content: String,
    },

    #[error("structured output is not a JSON object (got {0})")]
    NotAnObject(&'static str),
}
