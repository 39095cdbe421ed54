//! Tool handlers over the mock ERP functions
//!
//! Each handler parses its JSON input, calls one function from [`crate::erp`],
//! and renders the outcome as JSON text. Domain errors come back as an
//! `{"error": ...}` payload so the model can read them; only malformed input
//! is reported as a tool failure.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::erp::{DomainResult, OrderLine};

pub mod finance;
pub mod hr;
pub mod inventory;
pub mod sales;

pub use finance::{GenerateFinancialReportTool, GetAccountBalanceTool, RecordTransactionTool};
pub use hr::{GetEmployeeDataTool, ProcessPayrollTool, UpdateEmployeeInfoTool};
pub use inventory::{CheckInventoryLevelsTool, CreatePurchaseOrderTool, ReceiveInventoryTool};
pub use sales::{CreateSalesOrderTool, GetCustomerInfoTool, ProcessSalesOrderTool};

/// Render a domain result as JSON text, errors included
pub(crate) fn render<T: Serialize>(result: DomainResult<T>) -> Result<String> {
    let value = match result {
        Ok(found) => serde_json::to_value(found).context("Failed to serialize tool result")?,
        Err(e) => e.payload(),
    };
    Ok(value.to_string())
}

/// Parse an `items` array of `{item_id, quantity}` objects
pub(crate) fn order_lines(input: &Value, key: &str) -> Result<Vec<OrderLine>> {
    let raw = input
        .get(key)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))?;
    serde_json::from_value(raw).with_context(|| format!("Invalid '{}' parameter", key))
}

/// JSON schema fragment for an array of order lines
pub(crate) fn order_lines_schema(description: &str) -> Value {
    serde_json::json!({
        "type": "array",
        "description": description,
        "items": {
            "type": "object",
            "properties": {
                "item_id": { "type": "string", "description": "Inventory item id, e.g. ITM001" },
                "quantity": { "type": "integer", "minimum": 1 }
            },
            "required": ["item_id", "quantity"]
        }
    })
}
