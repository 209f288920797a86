//! LLM provider layer for Opsbot.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait that all providers implement
//! - [`registry`] — static specs for the supported providers + matching logic
//! - [`http_provider::HttpProvider`] — generic OpenAI-compatible HTTP client
//! - [`structured::StructuredClient`] — JSON-schema constrained output on top of any provider

pub mod error;
pub mod http_provider;
pub mod registry;
pub mod structured;
pub mod traits;

// Re-export main types for convenience
pub use error::LlmError;
pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderConfig, ProviderSpec, PROVIDERS};
pub use structured::{extract_first_json_object, StructuredClient};
pub use traits::{LlmProvider, LlmRequestConfig};
