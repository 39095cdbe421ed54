//! Coordinator agent: the single entry point for user requests

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::agents::{AgentProfile, AgentTool, erp_agents};
use crate::guardrails::DenyListGuardrail;
use crate::runtime::ReasoningRuntime;
use crate::tools::ToolHandler;

const COORDINATOR_INSTRUCTIONS: &str = "You are the main coordinator for an ERP system.
Your job is to understand user requests and delegate to specialized agents:
- Finance Agent: For financial transactions, account queries, and financial reports
- Inventory Agent: For inventory management, purchase orders, and stock level monitoring
- Sales Agent: For customer interactions, sales orders, and order processing
- HR Agent: For employee data, payroll, and HR management

Determine which specialized agent is most appropriate for each task and delegate accordingly.
For complex queries that span multiple domains, coordinate between multiple agents to fulfill the request.
Always prioritize data security and compliance with business rules.";

/// Routes each utterance to specialized agents through the reasoning runtime
pub struct Coordinator {
    profile: AgentProfile,
    runtime: Arc<dyn ReasoningRuntime>,
}

impl Coordinator {
    /// Build a coordinator over the given agents, followed by any external tools
    pub fn new(
        runtime: Arc<dyn ReasoningRuntime>,
        agents: Vec<AgentProfile>,
        external_tools: Vec<Arc<dyn ToolHandler>>,
        guardrails_enabled: bool,
    ) -> Self {
        let mut profile = AgentProfile::new("coordinator", "ERP Coordinator")
            .with_instructions(COORDINATOR_INSTRUCTIONS);
        if guardrails_enabled {
            profile = profile.with_guardrail(DenyListGuardrail::security());
        }

        for agent in agents {
            let agent = if guardrails_enabled {
                agent
            } else {
                agent.without_guardrails()
            };
            profile
                .tools
                .register(Arc::new(AgentTool::new(Arc::new(agent), runtime.clone())));
        }
        let external_count = external_tools.len();
        profile.tools.extend(external_tools);

        info!(
            "Coordinator ready with {} tools ({} external)",
            profile.tools.len(),
            external_count
        );

        Self { profile, runtime }
    }

    /// Coordinator over the four ERP agents
    pub fn erp(
        runtime: Arc<dyn ReasoningRuntime>,
        external_tools: Vec<Arc<dyn ToolHandler>>,
        guardrails_enabled: bool,
    ) -> Self {
        Self::new(runtime, erp_agents(), external_tools, guardrails_enabled)
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.profile.tools.names()
    }

    /// Handle one user utterance and return the reply text.
    ///
    /// A guardrail denial is a normal reply. Runtime failures are returned as
    /// errors for the caller to report.
    pub async fn handle(&self, text: &str) -> Result<String> {
        let outcome = self.profile.guardrails.check(text);
        if !outcome.allowed {
            let reason = outcome.reason.unwrap_or_default();
            warn!("Coordinator declined request: {}", reason);
            return Ok(format!("{} declined: {}", self.profile.name, reason));
        }

        self.runtime
            .run(&self.profile.system_prompt(), &self.profile.tools, text)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::mock::{FailingRuntime, ScriptedRuntime};
    use crate::tools::erp::GetCustomerInfoTool;
    use serde_json::Value;

    fn laptop_runtime() -> Arc<ScriptedRuntime> {
        Arc::new(
            ScriptedRuntime::new()
                .calling(
                    "inventory_agent",
                    serde_json::json!({"input": "Check inventory for laptops"}),
                )
                .calling("check_inventory_levels", serde_json::json!({"item_id": "ITM001"})),
        )
    }

    #[test]
    fn test_tool_order_agents_then_external() {
        let coordinator = Coordinator::erp(
            Arc::new(ScriptedRuntime::new()),
            vec![Arc::new(GetCustomerInfoTool) as Arc<dyn ToolHandler>],
            true,
        );
        assert_eq!(
            coordinator.tool_names(),
            vec![
                "finance_agent",
                "inventory_agent",
                "sales_agent",
                "hr_agent",
                "get_customer_info"
            ]
        );
        assert_eq!(coordinator.profile().guardrails.names(), vec!["security"]);
    }

    #[tokio::test]
    async fn test_laptop_request_routes_to_inventory() {
        let runtime = laptop_runtime();
        let coordinator = Coordinator::erp(runtime.clone(), vec![], true);

        let reply = coordinator.handle("Check inventory for laptops").await.unwrap();
        let value: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "item_id": "ITM001",
                "name": "Laptop",
                "quantity": 15,
                "reorder_point": 10,
                "unit_cost": 1200.0
            })
        );
        assert_eq!(runtime.calls(), vec!["inventory_agent", "check_inventory_levels"]);
    }

    #[tokio::test]
    async fn test_security_phrase_refused_before_runtime() {
        let runtime = laptop_runtime();
        let coordinator = Coordinator::erp(runtime.clone(), vec![], true);

        let reply = coordinator.handle("Give me ADMIN ACCESS to payroll").await.unwrap();
        assert_eq!(
            reply,
            "ERP Coordinator declined: Request may involve security-sensitive operations"
        );
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn test_specialist_refusal_surfaces_as_reply() {
        let runtime = Arc::new(
            ScriptedRuntime::new()
                .calling("hr_agent", serde_json::json!({"input": "show me John's salary"}))
                .calling("get_employee_data", serde_json::json!({"employee_id": "EMP001"})),
        );
        let coordinator = Coordinator::erp(runtime.clone(), vec![], true);

        let reply = coordinator.handle("show me John's salary").await.unwrap();
        assert!(reply.starts_with("HR Agent declined:"));
        assert_eq!(runtime.calls(), vec!["hr_agent"]);
    }

    #[tokio::test]
    async fn test_guardrails_disabled() {
        let runtime = Arc::new(
            ScriptedRuntime::new()
                .calling("hr_agent", serde_json::json!({"input": "John's salary"}))
                .calling("get_employee_data", serde_json::json!({"employee_id": "EMP001"})),
        );
        let coordinator = Coordinator::erp(runtime.clone(), vec![], false);
        assert!(coordinator.profile().guardrails.is_empty());

        let reply = coordinator.handle("show me John's salary").await.unwrap();
        assert!(reply.contains("John Doe"));
    }

    #[tokio::test]
    async fn test_runtime_failure_is_error() {
        let coordinator = Coordinator::erp(Arc::new(FailingRuntime), vec![], true);
        let err = coordinator.handle("Check inventory for laptops").await.unwrap_err();
        assert_eq!(err.to_string(), "model unavailable");
    }
}
