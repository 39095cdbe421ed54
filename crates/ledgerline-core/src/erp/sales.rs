//! Sales functions: customers and sales orders

use serde::Serialize;

use super::inventory::find_item;
use super::records::{CustomerInfo, SalesOrder, sample_customers};
use super::{DomainError, DomainResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesOrderConfirmation {
    pub status: String,
    pub order_id: String,
    pub message: String,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderProcessed {
    pub status: String,
    pub order_id: String,
    pub message: String,
}

pub fn get_customer_info(customer_id: &str) -> DomainResult<CustomerInfo> {
    sample_customers()
        .into_iter()
        .find(|c| c.customer_id == customer_id)
        .ok_or_else(|| DomainError::not_found("Customer", customer_id))
}

/// Price the order against the sample catalog and confirm it. Nothing is stored.
pub fn create_sales_order(order: &SalesOrder) -> DomainResult<SalesOrderConfirmation> {
    get_customer_info(&order.customer_id)?;

    let mut total = 0.0;
    for line in &order.items {
        let item = find_item(&line.item_id)?;
        total += item.unit_cost * f64::from(line.quantity);
    }

    Ok(SalesOrderConfirmation {
        status: "success".to_string(),
        order_id: order.order_id.clone(),
        message: "Sales order created successfully".to_string(),
        total_amount: order.total_amount.unwrap_or(total),
    })
}

pub fn process_sales_order(order_id: &str) -> DomainResult<OrderProcessed> {
    if order_id.trim().is_empty() {
        return Err(DomainError::Invalid("Order id must not be empty".to_string()));
    }
    Ok(OrderProcessed {
        status: "success".to_string(),
        order_id: order_id.to_string(),
        message: "Order processed successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::records::OrderLine;

    fn order(customer_id: &str, items: Vec<OrderLine>) -> SalesOrder {
        SalesOrder {
            order_id: "SO-100".to_string(),
            customer_id: customer_id.to_string(),
            items,
            status: "draft".to_string(),
            total_amount: None,
        }
    }

    #[test]
    fn test_known_customer() {
        let customer = get_customer_info("CUST002").unwrap();
        assert_eq!(customer.name, "TechStart Inc");
        assert_eq!(customer.email, "info@techstart.com");
    }

    #[test]
    fn test_unknown_customer() {
        let err = get_customer_info("CUST999").unwrap_err();
        assert_eq!(err.payload()["error"], "Customer CUST999 not found");
    }

    #[test]
    fn test_create_order_totals_lines() {
        let confirmation = create_sales_order(&order(
            "CUST001",
            vec![
                OrderLine { item_id: "ITM001".to_string(), quantity: 2 },
                OrderLine { item_id: "ITM002".to_string(), quantity: 3 },
            ],
        ))
        .unwrap();
        assert_eq!(confirmation.order_id, "SO-100");
        assert_eq!(confirmation.total_amount, 2460.0);
    }

    #[test]
    fn test_create_order_rejects_unknown_customer() {
        let err = create_sales_order(&order("CUST404", vec![])).unwrap_err();
        assert_eq!(err, DomainError::not_found("Customer", "CUST404"));
    }

    #[test]
    fn test_create_order_rejects_unknown_item() {
        let err = create_sales_order(&order(
            "CUST001",
            vec![OrderLine { item_id: "ITM999".to_string(), quantity: 1 }],
        ))
        .unwrap_err();
        assert_eq!(err, DomainError::not_found("Item", "ITM999"));
    }

    #[test]
    fn test_process_order() {
        let processed = process_sales_order("SO-100").unwrap();
        assert_eq!(processed.message, "Order processed successfully");
    }
}
