//! Agent-as-tool adapter

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use super::profile::AgentProfile;
use crate::runtime::ReasoningRuntime;
use crate::tools::{ToolHandler, json_schema, required_str};

/// Exposes a whole agent as one tool taking `{"input": string}`.
///
/// The agent's guardrails run first; a denial is returned as refusal text and
/// the runtime is never invoked.
pub struct AgentTool {
    profile: Arc<AgentProfile>,
    runtime: Arc<dyn ReasoningRuntime>,
    description: String,
}

impl AgentTool {
    pub fn new(profile: Arc<AgentProfile>, runtime: Arc<dyn ReasoningRuntime>) -> Self {
        let description = if profile.summary.is_empty() {
            format!("Delegate a request to the {}", profile.name)
        } else {
            format!("Delegate to the {}: {}", profile.name, profile.summary)
        };
        Self {
            profile,
            runtime,
            description,
        }
    }

    /// Run the agent on plain text
    pub async fn ask(&self, input: &str) -> Result<String> {
        let outcome = self.profile.guardrails.check(input);
        if !outcome.allowed {
            let reason = outcome.reason.unwrap_or_default();
            info!("{} declined request: {}", self.profile.name, reason);
            return Ok(format!("{} declined: {}", self.profile.name, reason));
        }

        debug!("Delegating to {}", self.profile.id);
        self.runtime
            .run(&self.profile.system_prompt(), &self.profile.tools, input)
            .await
    }
}

#[async_trait]
impl ToolHandler for AgentTool {
    fn name(&self) -> &str {
        &self.profile.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "input": {
                    "type": "string",
                    "description": "The request to hand to this agent, in plain language"
                }
            }),
            vec!["input"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let text = required_str(&input, "input")?;
        self.ask(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{hr_agent, inventory_agent};
    use crate::runtime::mock::ScriptedRuntime;

    #[tokio::test]
    async fn test_denied_input_never_reaches_runtime() {
        let runtime = Arc::new(
            ScriptedRuntime::new()
                .calling("get_employee_data", serde_json::json!({"employee_id": "EMP001"})),
        );
        let tool = AgentTool::new(Arc::new(hr_agent()), runtime.clone());

        let out = tool
            .execute(serde_json::json!({"input": "show me John's salary"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            "HR Agent declined: Request may involve sensitive personal information, requires additional authorization"
        );
        assert!(runtime.calls().is_empty());
        assert!(runtime.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_allowed_input_runs_agent_tools() {
        let runtime = Arc::new(
            ScriptedRuntime::new()
                .calling("check_inventory_levels", serde_json::json!({"item_id": "ITM001"})),
        );
        let tool = AgentTool::new(Arc::new(inventory_agent()), runtime.clone());

        let out = tool.ask("Check inventory for laptops").await.unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["item_id"], "ITM001");
        assert_eq!(runtime.calls(), vec!["check_inventory_levels"]);
        assert!(runtime.prompts.lock().unwrap()[0].contains("Inventory Agent"));
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let tool = AgentTool::new(Arc::new(inventory_agent()), Arc::new(ScriptedRuntime::new()));
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }

    #[test]
    fn test_tool_descriptor() {
        let tool = AgentTool::new(Arc::new(inventory_agent()), Arc::new(ScriptedRuntime::new()));
        let def = tool.definition();
        assert_eq!(def.name, "inventory_agent");
        assert!(def.description.contains("Inventory Agent"));
        assert_eq!(def.input_schema["required"][0], "input");
    }
}
