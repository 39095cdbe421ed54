//! ERP value records and the fixed sample tables they are read from

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub reorder_point: i64,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub position: String,
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub transaction_id: String,
    pub amount: f64,
    pub account_code: String,
    pub description: String,
    pub date: String,
}

/// One line of a purchase or sales order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub order_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default = "default_order_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

fn default_order_status() -> String {
    "draft".to_string()
}

// ── Sample tables ──

pub fn sample_inventory() -> Vec<InventoryItem> {
    vec![
        InventoryItem {
            item_id: "ITM001".to_string(),
            name: "Laptop".to_string(),
            quantity: 15,
            reorder_point: 10,
            unit_cost: 1200.0,
        },
        InventoryItem {
            item_id: "ITM002".to_string(),
            name: "Mouse".to_string(),
            quantity: 5,
            reorder_point: 20,
            unit_cost: 20.0,
        },
    ]
}

pub fn sample_employees() -> Vec<EmployeeRecord> {
    vec![
        EmployeeRecord {
            employee_id: "EMP001".to_string(),
            name: "John Doe".to_string(),
            department: "IT".to_string(),
            position: "Developer".to_string(),
            salary: 85000.0,
        },
        EmployeeRecord {
            employee_id: "EMP002".to_string(),
            name: "Jane Smith".to_string(),
            department: "Sales".to_string(),
            position: "Sales Manager".to_string(),
            salary: 90000.0,
        },
    ]
}

pub fn sample_customers() -> Vec<CustomerInfo> {
    vec![
        CustomerInfo {
            customer_id: "CUST001".to_string(),
            name: "Acme Corp".to_string(),
            email: "contact@acmecorp.com".to_string(),
            phone: "555-123-4567".to_string(),
            address: Some("123 Business St, Commerce City".to_string()),
        },
        CustomerInfo {
            customer_id: "CUST002".to_string(),
            name: "TechStart Inc".to_string(),
            email: "info@techstart.com".to_string(),
            phone: "555-987-6543".to_string(),
            address: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tables_have_two_rows() {
        assert_eq!(sample_inventory().len(), 2);
        assert_eq!(sample_employees().len(), 2);
        assert_eq!(sample_customers().len(), 2);
    }

    #[test]
    fn test_sales_order_defaults() {
        let order: SalesOrder =
            serde_json::from_str(r#"{"order_id":"SO-1","customer_id":"CUST001"}"#).unwrap();
        assert_eq!(order.status, "draft");
        assert!(order.items.is_empty());
        assert!(order.total_amount.is_none());
    }

    #[test]
    fn test_customer_without_address_omits_field() {
        let json = serde_json::to_string(&sample_customers()[1]).unwrap();
        assert!(!json.contains("address"));
    }
}
