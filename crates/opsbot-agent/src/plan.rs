//! Plan data model — steps, execution records, the result context, and the
//! verifier's verdict.
//!
//! These are the wire shapes exchanged with the language model:
//!
//! ```text
//! plan:         { "steps": [ { "step_id", "description", "tool_name", "tool_args" } ] }
//! verification: { "status", "final_answer", "missing_info", "retry_plan"? }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Sentinel `tool_name` for a step that needs no tool call.
pub const NO_TOOL: &str = "none";

/// Final answer used when the verifier returns a blank one.
pub const EMPTY_ANSWER: &str = "No answer could be produced from the execution results.";

// ─────────────────────────────────────────────
// Plan
// ─────────────────────────────────────────────

/// One planned action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub step_id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub tool_name: String,
    /// Arguments; string values may embed `{{step_N...}}` placeholders.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_args: Map<String, Value>,
}

impl Step {
    pub fn new(
        step_id: u64,
        description: impl Into<String>,
        tool_name: impl Into<String>,
        tool_args: Map<String, Value>,
    ) -> Self {
        Self {
            step_id,
            description: description.into(),
            tool_name: tool_name.into(),
            tool_args,
        }
    }

    /// Whether this step is a no-op (`tool_name == "none"`).
    pub fn is_noop(&self) -> bool {
        self.tool_name == NO_TOOL
    }
}

/// An ordered sequence of steps. Executed strictly in list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// A plan is only worth running if it has at least one step.
    pub fn is_actionable(&self) -> bool {
        !self.steps.is_empty()
    }
}

// ─────────────────────────────────────────────
// Execution
// ─────────────────────────────────────────────

/// What happened when one step ran. `tool_args` are the *resolved* arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub step_id: u64,
    pub description: String,
    pub tool_name: String,
    pub tool_args: Map<String, Value>,
    pub output: Value,
}

/// Outputs of the steps run so far, keyed by `step_id`.
///
/// Owned by one control-loop run. A later step with the same id overwrites
/// the earlier output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultContext {
    outputs: HashMap<u64, Value>,
}

impl ResultContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step_id: u64) -> Option<&Value> {
        self.outputs.get(&step_id)
    }

    pub fn insert(&mut self, step_id: u64, output: Value) {
        self.outputs.insert(step_id, output);
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl<const N: usize> From<[(u64, Value); N]> for ResultContext {
    fn from(entries: [(u64, Value); N]) -> Self {
        Self {
            outputs: HashMap::from(entries),
        }
    }
}

// ─────────────────────────────────────────────
// Verification
// ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Success,
    Failure,
}

impl VerificationStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// The verifier's judgement of an execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawVerification")]
pub struct Verification {
    pub status: VerificationStatus,
    /// Never empty.
    pub final_answer: String,
    /// Empty on success.
    pub missing_info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_plan: Option<Plan>,
}

impl Verification {
    /// The retry plan, if there is one with at least one step.
    pub fn actionable_retry(&self) -> Option<&Plan> {
        self.retry_plan.as_ref().filter(|p| p.is_actionable())
    }
}

/// Verification as the model actually sends it.
#[derive(Deserialize)]
struct RawVerification {
    #[serde(default)]
    status: Value,
    #[serde(default)]
    final_answer: Value,
    #[serde(default)]
    missing_info: Value,
    #[serde(default)]
    retry_plan: Option<Plan>,
}

impl From<RawVerification> for Verification {
    fn from(raw: RawVerification) -> Self {
        let status = match raw.status.as_str() {
            Some(s) if s.trim().eq_ignore_ascii_case("success") => VerificationStatus::Success,
            _ => VerificationStatus::Failure,
        };

        let final_answer = render_text(raw.final_answer);
        let final_answer = if final_answer.trim().is_empty() {
            EMPTY_ANSWER.to_string()
        } else {
            final_answer
        };

        Self {
            status,
            final_answer,
            missing_info: render_text(raw.missing_info),
            retry_plan: raw.retry_plan,
        }
    }
}

/// Strings as-is, null as empty, anything else as pretty JSON.
fn render_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
