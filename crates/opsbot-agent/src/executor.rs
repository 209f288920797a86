//! Executor — runs a plan's steps in order against the tool registry.
//!
//! Each step's arguments are resolved against the outputs of the steps run
//! before it, the tool is called, and the output is recorded both in the trace
//! and in the result context. Step failures become data; nothing here fails.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use opsbot_core::utils::preview_value;

use crate::plan::{ExecutionRecord, Plan, ResultContext};
use crate::resolver::resolve_args;
use crate::tools::ToolRegistry;

/// Output recorded for a `"none"` step.
pub const NO_TOOL_OUTPUT: &str = "No tool execution needed.";

/// Max characters of a tool output shown in debug logs.
const OUTPUT_PREVIEW_LEN: usize = 100;

pub struct Executor {
    tools: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Run every step of `plan` in list order.
    ///
    /// `context` carries outputs from earlier passes and receives this pass's
    /// outputs, so a retry plan can reference steps of the initial plan.
    pub async fn run(&self, plan: &Plan, context: &mut ResultContext) -> Vec<ExecutionRecord> {
        info!(steps = plan.steps.len(), "executor starting");
        let mut records = Vec::with_capacity(plan.steps.len());

        for step in &plan.steps {
            info!(
                step_id = step.step_id,
                description = %step.description,
                tool = %step.tool_name,
                "running step"
            );

            let tool_args = resolve_args(&step.tool_args, context);
            if tool_args != step.tool_args {
                let shown = Value::Object(tool_args.clone());
                debug!(step_id = step.step_id, args = %shown, "resolved args");
            }

            let output = if step.is_noop() {
                Value::String(NO_TOOL_OUTPUT.to_string())
            } else {
                let params: HashMap<String, Value> = tool_args.clone().into_iter().collect();
                self.tools.execute(&step.tool_name, params).await
            };

            debug!(
                step_id = step.step_id,
                output = %preview_value(&output, OUTPUT_PREVIEW_LEN),
                "step finished"
            );

            context.insert(step.step_id, output.clone());
            records.push(ExecutionRecord {
                step_id: step.step_id,
                description: step.description.clone(),
                tool_name: step.tool_name.clone(),
                tool_args,
                output,
            });
        }

        info!(records = records.len(), "executor finished");
        records
    }
}
