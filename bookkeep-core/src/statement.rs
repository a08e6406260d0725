//! Canonical statement model shared by every ingestion path.
//!
//! Structured JSON, the CSV fallback and the document-AI adapter all produce
//! these types. Every field has a deterministic default so consumers never
//! branch on presence, and reading from JSON is lenient (see `coerce`).

use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_money, lenient_string};

/// One parsed document covering one or more accounts over a period
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    #[serde(default)]
    pub metadata: StatementMetadata,
    /// Source order, not sorted
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatementMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_holder: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bank_name: String,
    #[serde(default)]
    pub statement_period: StatementPeriod,
}

/// Period bounds as the source printed them (not normalized)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatementPeriod {
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: String,
}

/// One account's balances and history within a statement.
///
/// `ending_balance` is stored as reported; it is not checked against
/// `beginning_balance` plus the transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Empty means the "unknown account" bucket
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub account_type: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub beginning_balance: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub ending_balance: f64,
    /// Statement order
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// One ledger line
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Display string from the source
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub deposit: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub withdrawal: f64,
    /// Balance right after this line
    #[serde(default, deserialize_with = "lenient_money")]
    pub running_balance: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub check_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
}

impl Statement {
    pub fn transaction_count(&self) -> usize {
        self.accounts.iter().map(|a| a.transactions.len()).sum()
    }
}

impl Account {
    /// Deposits minus withdrawals over the listed transactions
    pub fn net_change(&self) -> f64 {
        self.transactions
            .iter()
            .map(|t| t.deposit - t.withdrawal)
            .sum()
    }
}

/// Sequential running-balance fold.
///
/// Each line's balance depends on the previous line's resolved balance, so
/// this must be applied in statement order. An explicit balance from the
/// source wins and re-seeds the fold for the lines after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningBalance {
    current: f64,
}

impl RunningBalance {
    /// Seed with the account's beginning balance
    pub fn new(beginning_balance: f64) -> Self {
        Self {
            current: beginning_balance,
        }
    }

    pub fn apply(&mut self, deposit: f64, withdrawal: f64, explicit: Option<f64>) -> f64 {
        self.current = match explicit {
            Some(balance) => balance,
            None => self.current + deposit - withdrawal,
        };
        self.current
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_from_beginning_balance() {
        let mut rb = RunningBalance::new(100.0);
        let balances: Vec<f64> = [(50.0, 0.0), (0.0, 30.0)]
            .iter()
            .map(|&(d, w)| rb.apply(d, w, None))
            .collect();
        assert_eq!(balances, vec![150.0, 120.0]);
    }

    #[test]
    fn test_explicit_balance_reseeds_fold() {
        let mut rb = RunningBalance::new(100.0);
        assert_eq!(rb.apply(10.0, 0.0, None), 110.0);
        assert_eq!(rb.apply(10.0, 0.0, Some(500.0)), 500.0);
        assert_eq!(rb.apply(0.0, 25.0, None), 475.0);
        assert_eq!(rb.current(), 475.0);
    }

    #[test]
    fn test_defaults_are_empty() {
        let s = Statement::default();
        assert_eq!(s.metadata.account_holder, "");
        assert_eq!(s.metadata.statement_period.start_date, "");
        assert!(s.accounts.is_empty());
        assert_eq!(s.transaction_count(), 0);

        let t = Transaction::default();
        assert_eq!(t.deposit, 0.0);
        assert_eq!(t.running_balance, 0.0);
    }

    #[test]
    fn test_lenient_json() {
        let json = r#"{
            "metadata": {"account_holder": null, "bank_name": "Scotiabank"},
            "accounts": [{
                "account_number": 12345,
                "beginning_balance": "$1,000.00",
                "transactions": [
                    {"date": "2025-01-05", "deposit": "50", "withdrawal": null,
                     "running_balance": 1050}
                ]
            }]
        }"#;
        let s: Statement = serde_json::from_str(json).unwrap();
        assert_eq!(s.metadata.account_holder, "");
        assert_eq!(s.metadata.bank_name, "Scotiabank");
        assert_eq!(s.metadata.statement_period, StatementPeriod::default());

        let acct = &s.accounts[0];
        assert_eq!(acct.account_number, "12345");
        assert_eq!(acct.beginning_balance, 1000.0);
        assert_eq!(acct.ending_balance, 0.0);
        assert_eq!(acct.transactions[0].deposit, 50.0);
        assert_eq!(acct.transactions[0].withdrawal, 0.0);
        assert_eq!(acct.transactions[0].running_balance, 1050.0);
        assert_eq!(acct.net_change(), 50.0);
    }

    #[test]
    fn test_wrong_shape_is_an_error() {
        let json = r#"{"accounts": "none"}"#;
        assert!(serde_json::from_str::<Statement>(json).is_err());
    }
}
