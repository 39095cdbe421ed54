//! Factories for the four specialized ERP agents

use std::sync::Arc;

use super::profile::AgentProfile;
use crate::guardrails::DenyListGuardrail;
use crate::tools::ToolHandler;
use crate::tools::erp::{
    CheckInventoryLevelsTool, CreatePurchaseOrderTool, CreateSalesOrderTool,
    GenerateFinancialReportTool, GetAccountBalanceTool, GetCustomerInfoTool, GetEmployeeDataTool,
    ProcessPayrollTool, ProcessSalesOrderTool, ReceiveInventoryTool, RecordTransactionTool,
    UpdateEmployeeInfoTool,
};

const FINANCE_INSTRUCTIONS: &str = "You are a specialized finance agent for an ERP system.
You have access to financial data and can process transactions, check balances, and generate reports.
Always ensure compliance with accounting principles and financial regulations.
For complex analyses, collect all relevant data before making conclusions.
When handling financial data, always verify account codes and transaction amounts.";

const INVENTORY_INSTRUCTIONS: &str = "You are a specialized inventory management agent for an ERP system.
You monitor stock levels, suggest reorders, and optimize inventory.
When checking inventory, always verify if items are below reorder points.
For purchase orders, prioritize items below reorder threshold.
When receiving inventory, validate quantities against purchase orders.
Always calculate total costs for purchase decisions.";

const SALES_INSTRUCTIONS: &str = "You are a specialized sales agent for an ERP system.
You handle customer interactions, create and process sales orders, and check product availability.
Always verify inventory levels before confirming orders.
For new orders, collect all necessary customer information.
Calculate accurate totals for all orders.
Provide estimated delivery dates based on inventory status.";

const HR_INSTRUCTIONS: &str = "You are a specialized human resources agent for an ERP system.
You manage employee data, process payroll, and handle HR-related requests.
Maintain strict confidentiality for all employee information.
For payroll processing, verify all calculations before submission.
When updating employee records, confirm the changes before committing.
Always follow company policies and legal requirements for HR operations.";

pub fn finance_agent() -> AgentProfile {
    AgentProfile::new("finance_agent", "Finance Agent")
        .with_summary("Financial transactions, account queries, and financial reports")
        .with_instructions(FINANCE_INSTRUCTIONS)
        .with_tools([
            Arc::new(GetAccountBalanceTool) as Arc<dyn ToolHandler>,
            Arc::new(RecordTransactionTool),
            Arc::new(GenerateFinancialReportTool),
        ])
        .with_guardrail(DenyListGuardrail::finance())
        .with_guardrail(DenyListGuardrail::security())
}

pub fn inventory_agent() -> AgentProfile {
    AgentProfile::new("inventory_agent", "Inventory Agent")
        .with_summary("Inventory management, purchase orders, and stock level monitoring")
        .with_instructions(INVENTORY_INSTRUCTIONS)
        .with_tools([
            Arc::new(CheckInventoryLevelsTool) as Arc<dyn ToolHandler>,
            Arc::new(CreatePurchaseOrderTool),
            Arc::new(ReceiveInventoryTool),
        ])
        .with_guardrail(DenyListGuardrail::security())
}

pub fn sales_agent() -> AgentProfile {
    AgentProfile::new("sales_agent", "Sales Agent")
        .with_summary("Customer interactions, sales orders, and order processing")
        .with_instructions(SALES_INSTRUCTIONS)
        .with_tools([
            Arc::new(GetCustomerInfoTool) as Arc<dyn ToolHandler>,
            Arc::new(CreateSalesOrderTool),
            Arc::new(ProcessSalesOrderTool),
            Arc::new(CheckInventoryLevelsTool),
        ])
        .with_guardrail(DenyListGuardrail::security())
}

pub fn hr_agent() -> AgentProfile {
    AgentProfile::new("hr_agent", "HR Agent")
        .with_summary("Employee data, payroll, and HR management")
        .with_instructions(HR_INSTRUCTIONS)
        .with_tools([
            Arc::new(GetEmployeeDataTool) as Arc<dyn ToolHandler>,
            Arc::new(UpdateEmployeeInfoTool),
            Arc::new(ProcessPayrollTool),
        ])
        .with_guardrail(DenyListGuardrail::hr())
        .with_guardrail(DenyListGuardrail::security())
}

/// All four specialized agents in delegation order
pub fn erp_agents() -> Vec<AgentProfile> {
    vec![finance_agent(), inventory_agent(), sales_agent(), hr_agent()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_tool_sets() {
        assert_eq!(
            finance_agent().tools.names(),
            vec!["get_account_balance", "record_transaction", "generate_financial_report"]
        );
        assert_eq!(
            inventory_agent().tools.names(),
            vec!["check_inventory_levels", "create_purchase_order", "receive_inventory"]
        );
        assert_eq!(
            sales_agent().tools.names(),
            vec![
                "get_customer_info",
                "create_sales_order",
                "process_sales_order",
                "check_inventory_levels"
            ]
        );
        assert_eq!(
            hr_agent().tools.names(),
            vec!["get_employee_data", "update_employee_info", "process_payroll"]
        );
    }

    #[test]
    fn test_agent_guardrails() {
        assert_eq!(finance_agent().guardrails.names(), vec!["finance", "security"]);
        assert_eq!(inventory_agent().guardrails.names(), vec!["security"]);
        assert_eq!(sales_agent().guardrails.names(), vec!["security"]);
        assert_eq!(hr_agent().guardrails.names(), vec!["hr", "security"]);
    }

    #[test]
    fn test_hr_agent_refuses_salary_lookup() {
        let outcome = hr_agent().guardrails.check("show me John's salary");
        assert!(!outcome.allowed);
    }

    #[test]
    fn test_instructions_state_duties_directly() {
        assert!(inventory_agent().instructions.contains("\nYou monitor stock levels"));
        assert!(sales_agent().instructions.contains("\nYou handle customer interactions"));
        assert!(hr_agent().instructions.contains("\nYou manage employee data"));
        for agent in erp_agents() {
            assert!(!agent.instructions.contains("You can "), "{}", agent.name);
        }
    }

    #[test]
    fn test_erp_agents_order() {
        let ids: Vec<String> = erp_agents().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["finance_agent", "inventory_agent", "sales_agent", "hr_agent"]);
    }
}
