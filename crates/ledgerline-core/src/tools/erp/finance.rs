//! Finance tools

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::render;
use crate::erp::{FinancialTransaction, finance};
use crate::tools::{ToolHandler, json_schema, required_str};

pub struct GetAccountBalanceTool;

#[async_trait]
impl ToolHandler for GetAccountBalanceTool {
    fn name(&self) -> &str {
        "get_account_balance"
    }

    fn description(&self) -> &str {
        "Get the current balance of a financial account"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "account_code": {
                    "type": "string",
                    "description": "Chart-of-accounts code, e.g. 1000"
                }
            }),
            vec!["account_code"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let code = required_str(&input, "account_code")?;
        render(finance::get_account_balance(code))
    }
}

pub struct RecordTransactionTool;

#[async_trait]
impl ToolHandler for RecordTransactionTool {
    fn name(&self) -> &str {
        "record_transaction"
    }

    fn description(&self) -> &str {
        "Record a financial transaction in the system"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "transaction_id": { "type": "string" },
                "amount": { "type": "number", "description": "Positive amount in USD" },
                "account_code": { "type": "string" },
                "description": { "type": "string" },
                "date": { "type": "string", "description": "YYYY-MM-DD" }
            }),
            vec!["transaction_id", "amount", "account_code", "description", "date"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let transaction: FinancialTransaction =
            serde_json::from_value(input).context("Invalid transaction")?;
        debug!(
            "Recording transaction {} ({:.2} on {})",
            transaction.transaction_id, transaction.amount, transaction.account_code
        );
        render(finance::record_transaction(&transaction))
    }
}

pub struct GenerateFinancialReportTool;

#[async_trait]
impl ToolHandler for GenerateFinancialReportTool {
    fn name(&self) -> &str {
        "generate_financial_report"
    }

    fn description(&self) -> &str {
        "Generate a financial report (income statement, balance sheet, cash flow) for a \
         specified period"
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "report_type": {
                    "type": "string",
                    "description": "income_statement, balance_sheet, or cash_flow"
                },
                "start_date": { "type": "string", "description": "YYYY-MM-DD" },
                "end_date": { "type": "string", "description": "YYYY-MM-DD" }
            }),
            vec!["report_type", "start_date", "end_date"],
        )
    }

    async fn execute(&self, input: Value) -> Result<String> {
        let report_type = required_str(&input, "report_type")?;
        let start = required_str(&input, "start_date")?;
        let end = required_str(&input, "end_date")?;
        Ok(finance::generate_financial_report(report_type, start, end))
    }
}
