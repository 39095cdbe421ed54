//! Finance functions: balances, transactions, reports

use serde::Serialize;

use super::records::FinancialTransaction;
use super::{DomainError, DomainResult};

/// Balance reported for every account in the sample ledger
const SAMPLE_BALANCE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub account_code: String,
    pub balance: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReceipt {
    pub status: String,
    pub transaction_id: String,
}

pub fn get_account_balance(account_code: &str) -> DomainResult<AccountBalance> {
    let code = account_code.trim();
    if code.is_empty() {
        return Err(DomainError::Invalid(
            "Account code must not be empty".to_string(),
        ));
    }
    Ok(AccountBalance {
        account_code: code.to_string(),
        balance: SAMPLE_BALANCE,
        currency: "USD".to_string(),
    })
}

pub fn record_transaction(transaction: &FinancialTransaction) -> DomainResult<TransactionReceipt> {
    if transaction.amount <= 0.0 {
        return Err(DomainError::Invalid(format!(
            "Transaction {} has a non-positive amount",
            transaction.transaction_id
        )));
    }
    Ok(TransactionReceipt {
        status: "success".to_string(),
        transaction_id: transaction.transaction_id.clone(),
    })
}

pub fn generate_financial_report(report_type: &str, start_date: &str, end_date: &str) -> String {
    format!(
        "Financial report of type {} for period {} to {} generated",
        report_type, start_date, end_date
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_balance() {
        let balance = get_account_balance("1000").unwrap();
        assert_eq!(balance.account_code, "1000");
        assert_eq!(balance.balance, 10_000.0);
        assert_eq!(balance.currency, "USD");
    }

    #[test]
    fn test_account_balance_blank_code() {
        assert!(get_account_balance("   ").is_err());
    }

    #[test]
    fn test_record_transaction() {
        let tx = FinancialTransaction {
            transaction_id: "TX-1".to_string(),
            amount: 250.0,
            account_code: "4000".to_string(),
            description: "Consulting".to_string(),
            date: "2024-01-31".to_string(),
        };
        let receipt = record_transaction(&tx).unwrap();
        assert_eq!(receipt.status, "success");
        assert_eq!(receipt.transaction_id, "TX-1");

        let negative = FinancialTransaction { amount: -5.0, ..tx };
        assert!(record_transaction(&negative).is_err());
    }

    #[test]
    fn test_report_text() {
        let report = generate_financial_report("cash_flow", "2023-04-01", "2023-06-30");
        assert_eq!(
            report,
            "Financial report of type cash_flow for period 2023-04-01 to 2023-06-30 generated"
        );
    }
}
