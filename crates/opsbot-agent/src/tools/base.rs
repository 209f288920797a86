//! Tool trait — the interface every executor tool implements.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use opsbot_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every tool implements this trait.
///
/// The planner sees tools via `to_definition()`; the executor dispatches
/// calls through the registry by `name()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the planner uses in `tool_name` (e.g. `"get_weather"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the planner.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Run the tool with named arguments.
    ///
    /// Returns any JSON-compatible value. Domain failures the caller should
    /// see (city not found, HTTP 404) are returned as error-shaped values;
    /// an `Err` is turned into an error string by the registry.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value>;

    /// Build the `ToolDefinition` shown to the planner.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract an optional `String` param.
pub fn optional_string(params: &HashMap<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract an optional integer param. Numeric strings (`"5"`) are accepted
/// because planners often quote numbers.
pub fn optional_i64(params: &HashMap<String, Value>, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_string_present() {
        let mut params = HashMap::new();
        params.insert("city".into(), json!("London"));
        assert_eq!(require_string(&params, "city").unwrap(), "London");
    }

    #[test]
    fn test_require_string_missing() {
        let params = HashMap::new();
        let err = require_string(&params, "city").unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_require_string_wrong_type() {
        let mut params = HashMap::new();
        params.insert("city".into(), json!(42));
        assert!(require_string(&params, "city").is_err());
    }

    #[test]
    fn test_optional_string() {
        let mut params = HashMap::new();
        params.insert("path".into(), json!("README.md"));
        assert_eq!(optional_string(&params, "path"), Some("README.md".into()));
        assert_eq!(optional_string(&params, "other"), None);
    }

    #[test]
    fn test_optional_i64_number_and_string() {
        let mut params = HashMap::new();
        params.insert("limit".into(), json!(3));
        params.insert("quoted".into(), json!(" 7 "));
        params.insert("bad".into(), json!("seven"));
        assert_eq!(optional_i64(&params, "limit"), Some(3));
        assert_eq!(optional_i64(&params, "quoted"), Some(7));
        assert_eq!(optional_i64(&params, "bad"), None);
        assert_eq!(optional_i64(&params, "missing"), None);
    }

    #[test]
    fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str {
                "dummy"
            }
            fn description(&self) -> &str {
                "A test tool"
            }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": { "msg": { "type": "string" } },
                    "required": ["msg"]
                })
            }
            async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
                Ok(json!("ok"))
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A test tool");
        assert_eq!(def.tool_type, "function");
    }
}
