//! Tool Registry — name-keyed store of tools.
//!
//! Built once at startup and shared read-only (`Arc<ToolRegistry>`) by the
//! planner, which lists the definitions, and the executor, which dispatches
//! calls by name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use opsbot_core::types::ToolDefinition;

use super::base::Tool;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so tools can be shared across threads.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool; a later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "replaced tool with the same name");
        } else {
            info!(tool = %name, "registered tool");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the planner-facing definitions for all registered tools.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// Execute a tool by name with the given parameters.
    ///
    /// Never fails: an unknown name or a tool error comes back as an
    /// error-shaped string value so the step can be recorded and verified.
    pub async fn execute(&self, name: &str, params: HashMap<String, Value>) -> Value {
        let Some(tool) = self.get(name) else {
            warn!(tool = name, "tool not found");
            return Value::String(format!("Error: Tool '{name}' not found."));
        };

        tool.execute(params).await.unwrap_or_else(|e| {
            warn!(tool = name, error = %e, "tool execution failed");
            Value::String(format!("Error executing tool: {e}"))
        })
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
