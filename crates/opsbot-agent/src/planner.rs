//! Planner — turns a request into a step sequence via the language model.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use opsbot_core::types::Message;
use opsbot_providers::StructuredClient;

use crate::error::AgentError;
use crate::plan::{Plan, NO_TOOL};
use crate::template;
use crate::tools::ToolRegistry;

/// Anything that can produce a plan for a request.
#[async_trait]
pub trait PlanProducer: Send + Sync {
    async fn plan(&self, query: &str) -> Result<Plan, AgentError>;
}

const PLANNER_PROMPT: &str = r#"You are a Planner Agent.
Your goal is to break down a user's natural language request into a minimal sequence of steps that can be executed using the available tools.

Available Tools:
{tools}

Planning Rules:
- ONLY add steps that are necessary to satisfy the user's request.
- Prefer the smallest number of steps possible.
- If the user only asks for weather, use only the "get_weather" tool.
- If the user asks for GitHub information only, use only the GitHub tools.

Output Format:
You must output a valid JSON object with a "steps" key.
"steps" is a list of objects, where each object has:
- "step_id": integer, 1-indexed
- "description": string, what to do in this step
- "tool_name": string, the name of the tool to use ("none" if no tool is needed)
- "tool_args": object, specific arguments.

Data Dependencies:
If a step needs data from a previous step, reference earlier outputs with placeholders in this format:
- "{{step_1}}" to refer to the full output of step 1.
- "{{step_1[0].name}}" to refer to a field inside a list/dict output (list index + dict key).

IMPORTANT:
- Use EXACTLY double braces like "{{...}}".
- Use keys that match tool outputs. For GitHub search results, use "name", "description", "stars", "url".

Example Plan:
{
  "steps": [
    {
      "step_id": 1,
      "description": "Find a weather library",
      "tool_name": "github_search",
      "tool_args": { "query": "weather", "limit": 1 }
    },
    {
      "step_id": 2,
      "description": "Get content of the repo",
      "tool_name": "github_content",
      "tool_args": { "repo_name": "{{step_1[0].name}}", "path": "README.md" }
    }
  ]
}

User Request: {query}
"#;

/// LLM-backed planner over a fixed tool registry.
pub struct Planner {
    llm: StructuredClient,
    tools: Arc<ToolRegistry>,
}

impl Planner {
    pub fn new(llm: StructuredClient, tools: Arc<ToolRegistry>) -> Self {
        Self { llm, tools }
    }

    fn prompt(&self, query: &str) -> String {
        let definitions = self.tools.get_definitions();
        let tools = serde_json::to_string_pretty(&definitions).unwrap_or_else(|_| "[]".into());
        template::fill(PLANNER_PROMPT, &[("tools", tools.as_str()), ("query", query)])
    }

    /// Output schema; `tool_name` is limited to registered tools plus `"none"`.
    fn schema(&self) -> Value {
        let mut names = self.tools.tool_names();
        names.push(NO_TOOL.to_string());
        names.sort();
        names.dedup();

        json!({
            "type": "object",
            "properties": {
                "steps": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "step_id": { "type": "integer" },
                            "description": { "type": "string" },
                            "tool_name": { "type": "string", "enum": names },
                            "tool_args": { "type": "object" }
                        },
                        "required": ["step_id", "description", "tool_name", "tool_args"]
                    }
                }
            },
            "required": ["steps"]
        })
    }
}

#[async_trait]
impl PlanProducer for Planner {
    async fn plan(&self, query: &str) -> Result<Plan, AgentError> {
        let messages = vec![
            Message::system(self.prompt(query)),
            Message::user("Create a plan for this request."),
        ];

        let raw = Value::Object(self.llm.structured_output(&messages, &self.schema()).await?);
        debug!(plan = %raw, "raw plan");

        let plan: Plan = serde_json::from_value(raw).map_err(AgentError::malformed("planner"))?;
        info!(steps = plan.steps.len(), "plan ready");
        Ok(plan)
    }
}
