//! Sales tools

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{order_lines_schema, render};
use crate::erp::{SalesOrder, sales};
use crate::tools::{ToolHandler, json_schema, required_str};

pub struct GetCustomerInfoTool;

#[async_trait]
impl ToolHandler for GetCustomerInfoTool {
    fn name(&self) -> &str {
        "get_customer_info"
    }

    fn description(&self) -> &str {
        "Get information about a customer (name, email, phone, address) by customer id, \
         e.g. CUST001 for Acme Corp"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "customer_id": { "type": "string", "description": "Customer id" }
            }),
            vec!["customer_id"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let id = required_str(&input, "customer_id")?;
        render(sales::get_customer_info(id))
    }
}

pub struct CreateSalesOrderTool;

#[async_trait]
impl ToolHandler for CreateSalesOrderTool {
    fn name(&self) -> &str {
        "create_sales_order"
    }

    fn description(&self) -> &str {
        "Create a new sales order for a customer. Totals are priced from the inventory catalog."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "order_id": { "type": "string" },
                "customer_id": { "type": "string" },
                "items": order_lines_schema("Items and quantities sold"),
                "status": { "type": "string", "description": "Defaults to draft" }
            }),
            vec!["order_id", "customer_id", "items"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let order: SalesOrder = serde_json::from_value(input).context("Invalid sales order")?;
        render(sales::create_sales_order(&order))
    }
}

pub struct ProcessSalesOrderTool;

#[async_trait]
impl ToolHandler for ProcessSalesOrderTool {
    fn name(&self) -> &str {
        "process_sales_order"
    }

    fn description(&self) -> &str {
        "Process and fulfill a sales order (check inventory, reserve items, generate invoice)"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "order_id": { "type": "string" }
            }),
            vec!["order_id"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let id = required_str(&input, "order_id")?;
        render(sales::process_sales_order(id))
    }
}
