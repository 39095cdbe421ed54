//! Mock ERP domain: sample data and the functions agents call against it
//!
//! Every function reads the fixed sample tables in [`records`]. Operations that
//! would mutate state (orders, transactions, payroll) return a fabricated
//! confirmation and persist nothing. A missing identifier is reported as a
//! [`DomainError`], which tools hand back to the model as `{"error": "..."}`.

use serde_json::Value;
use thiserror::Error;

pub mod finance;
pub mod hr;
pub mod inventory;
pub mod records;
pub mod sales;

pub use records::{
    CustomerInfo, EmployeeRecord, FinancialTransaction, InventoryItem, OrderLine, SalesOrder,
};

/// Domain-level failure. Returned as data, never raised past the tool layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("No employees found in department {0}")]
    EmptyDepartment(String),
    #[error("{0}")]
    Invalid(String),
}

impl DomainError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// The `{"error": "..."}` object handed back to the caller
    pub fn payload(&self) -> Value {
        serde_json::json!({ "error": self.to_string() })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
