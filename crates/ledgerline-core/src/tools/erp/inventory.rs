//! Inventory tools

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{order_lines, order_lines_schema, render};
use crate::erp::inventory;
use crate::tools::{ToolHandler, json_schema, optional_str, required_str};

/// Look up stock for one item or the whole warehouse
pub struct CheckInventoryLevelsTool;

#[async_trait]
impl ToolHandler for CheckInventoryLevelsTool {
    fn name(&self) -> &str {
        "check_inventory_levels"
    }

    fn description(&self) -> &str {
        "Check current inventory levels for a product. Pass item_id (e.g. ITM001 for laptops, \
         ITM002 for mice) to get one item; omit it to list every item with quantity, reorder \
         point, and unit cost."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "item_id": {
                    "type": "string",
                    "description": "Inventory item id (optional)"
                }
            }),
            vec![],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let item_id = optional_str(&input, "item_id");
        debug!("Checking inventory levels (item: {:?})", item_id);
        render(inventory::check_inventory_levels(item_id))
    }
}

pub struct CreatePurchaseOrderTool;

#[async_trait]
impl ToolHandler for CreatePurchaseOrderTool {
    fn name(&self) -> &str {
        "create_purchase_order"
    }

    fn description(&self) -> &str {
        "Create a purchase order for inventory. Returns the order id and the estimated total \
         cost at current unit prices."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "items": order_lines_schema("Items and quantities to order")
            }),
            vec!["items"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let items = order_lines(&input, "items")?;
        debug!("Creating purchase order for {} lines", items.len());
        render(inventory::create_purchase_order(items))
    }
}

pub struct ReceiveInventoryTool;

#[async_trait]
impl ToolHandler for ReceiveInventoryTool {
    fn name(&self) -> &str {
        "receive_inventory"
    }

    fn description(&self) -> &str {
        "Record receipt of inventory items against a purchase order"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "purchase_order_id": {
                    "type": "string",
                    "description": "Purchase order the goods arrived against, e.g. PO-12345"
                },
                "items_received": order_lines_schema("Items and quantities received")
            }),
            vec!["purchase_order_id", "items_received"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let po = required_str(&input, "purchase_order_id")?;
        let items = order_lines(&input, "items_received")?;
        render(inventory::receive_inventory(po, items))
    }
}
