//! HR tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::render;
use crate::erp::hr;
use crate::tools::{ToolHandler, json_schema, optional_str, required_str};

pub struct GetEmployeeDataTool;

#[async_trait]
impl ToolHandler for GetEmployeeDataTool {
    fn name(&self) -> &str {
        "get_employee_data"
    }

    fn description(&self) -> &str {
        "Get information about an employee by employee id, e.g. EMP001"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "employee_id": { "type": "string" }
            }),
            vec!["employee_id"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let id = required_str(&input, "employee_id")?;
        render(hr::get_employee_data(id))
    }
}

pub struct UpdateEmployeeInfoTool;

#[async_trait]
impl ToolHandler for UpdateEmployeeInfoTool {
    fn name(&self) -> &str {
        "update_employee_info"
    }

    fn description(&self) -> &str {
        "Update a single field of an employee record"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "employee_id": { "type": "string" },
                "field": { "type": "string", "description": "Field to change, e.g. position" },
                "value": { "description": "New value for the field" }
            }),
            vec!["employee_id", "field", "value"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let id = required_str(&input, "employee_id")?;
        let field = required_str(&input, "field")?;
        let value = input
            .get("value")
            .ok_or_else(|| anyhow::anyhow!("Missing 'value' parameter"))?;
        render(hr::update_employee_info(id, field, value))
    }
}

pub struct ProcessPayrollTool;

#[async_trait]
impl ToolHandler for ProcessPayrollTool {
    fn name(&self) -> &str {
        "process_payroll"
    }

    fn description(&self) -> &str {
        "Process payroll for all employees or for one department"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "department": {
                    "type": "string",
                    "description": "Department name, e.g. IT (optional)"
                }
            }),
            vec![],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        render(hr::process_payroll(optional_str(&input, "department")))
    }
}
