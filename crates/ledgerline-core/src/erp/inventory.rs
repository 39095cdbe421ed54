//! Inventory functions: stock levels, purchase orders, goods receipt

use serde::Serialize;

use super::records::{InventoryItem, OrderLine, sample_inventory};
use super::{DomainError, DomainResult};

/// Fixed identifier handed out for every fabricated purchase order
pub const PURCHASE_ORDER_ID: &str = "PO-12345";

/// Result of a stock query: a single record when filtered, otherwise the whole table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StockLevels {
    Item(InventoryItem),
    All(Vec<InventoryItem>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrderConfirmation {
    pub status: String,
    pub order_id: String,
    pub message: String,
    pub items: Vec<OrderLine>,
    pub estimated_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptConfirmation {
    pub status: String,
    pub purchase_order_id: String,
    pub message: String,
    pub items_received: Vec<OrderLine>,
}

pub fn find_item(item_id: &str) -> DomainResult<InventoryItem> {
    sample_inventory()
        .into_iter()
        .find(|item| item.item_id == item_id)
        .ok_or_else(|| DomainError::not_found("Item", item_id))
}

pub fn check_inventory_levels(item_id: Option<&str>) -> DomainResult<StockLevels> {
    match item_id {
        Some(id) => find_item(id).map(StockLevels::Item),
        None => Ok(StockLevels::All(sample_inventory())),
    }
}

pub fn create_purchase_order(items: Vec<OrderLine>) -> DomainResult<PurchaseOrderConfirmation> {
    if items.is_empty() {
        return Err(DomainError::Invalid(
            "Purchase order must contain at least one item".to_string(),
        ));
    }

    let mut estimated_total = 0.0;
    for line in &items {
        let item = find_item(&line.item_id)?;
        estimated_total += item.unit_cost * f64::from(line.quantity);
    }

    Ok(PurchaseOrderConfirmation {
        status: "success".to_string(),
        order_id: PURCHASE_ORDER_ID.to_string(),
        message: "Purchase order created successfully".to_string(),
        items,
        estimated_total,
    })
}

pub fn receive_inventory(
    purchase_order_id: &str,
    items_received: Vec<OrderLine>,
) -> DomainResult<ReceiptConfirmation> {
    if purchase_order_id.trim().is_empty() {
        return Err(DomainError::Invalid(
            "Purchase order id must not be empty".to_string(),
        ));
    }
    Ok(ReceiptConfirmation {
        status: "success".to_string(),
        purchase_order_id: purchase_order_id.to_string(),
        message: "Inventory received".to_string(),
        items_received,
    })
}
