//! Opsbot Agent — plan, execute, verify.
//!
//! This crate contains:
//! - **plan**: steps, execution records, result context, verification
//! - **resolver**: `{{step_N.path}}` placeholder substitution
//! - **tools**: Tool trait, registry, and built-in tools (weather, GitHub)
//! - **executor**: sequential step runner with per-step failure isolation
//! - **planner** / **verifier**: language-model backed plan producer and judge
//! - **control**: the bounded verify-and-retry loop

pub mod control;
pub mod error;
pub mod executor;
pub mod plan;
pub mod planner;
pub mod resolver;
mod template;
pub mod tools;
pub mod verifier;

#[cfg(test)]
mod test_support;

pub use control::{ControlLoop, LoopObserver, NoopObserver, RunOutcome, StopReason};
pub use error::AgentError;
pub use executor::Executor;
pub use plan::{ExecutionRecord, Plan, ResultContext, Step, Verification, VerificationStatus};
pub use planner::{PlanProducer, Planner};
pub use resolver::resolve_args;
pub use tools::{default_registry, Tool, ToolRegistry};
pub use verifier::{OutcomeVerifier, Verifier};
