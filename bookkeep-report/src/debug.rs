//! Sanity-check summaries for the debug views.

use std::collections::BTreeMap;
use std::path::PathBuf;

use bookkeep_core::{parse_date, Account, Receipt, Statement, Transaction};
use serde::Serialize;

use crate::receipts::UNKNOWN_MERCHANT;

const TOP_MERCHANTS: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatementDebug {
    pub statements_count: usize,
    pub accounts_count: usize,
    pub transactions_count: usize,
    pub sample_statement: Option<Statement>,
    pub sample_account: Option<Account>,
    pub sample_transaction: Option<Transaction>,
}

impl StatementDebug {
    pub fn new(statements: &[Statement]) -> Self {
        let sample_statement = statements.first().cloned();
        let sample_account = statements
            .iter()
            .flat_map(|s| s.accounts.iter())
            .next()
            .cloned();
        let sample_transaction = sample_account
            .as_ref()
            .and_then(|a| a.transactions.first().cloned());

        Self {
            statements_count: statements.len(),
            accounts_count: statements.iter().map(|s| s.accounts.len()).sum(),
            transactions_count: statements.iter().map(Statement::transaction_count).sum(),
            sample_statement,
            sample_account,
            sample_transaction,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DateRange {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiptDebug {
    pub files_found: Vec<String>,
    pub file_count: usize,
    pub receipt_count: usize,
    /// `(merchant, receipts)` pairs, most receipts first
    pub merchants_top: Vec<(String, usize)>,
    pub date_range: DateRange,
    pub sample_receipt: Option<Receipt>,
}

impl ReceiptDebug {
    pub fn new(files: &[PathBuf], receipts: &[Receipt]) -> Self {
        let files_found: Vec<String> = files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();

        let mut merchants: BTreeMap<&str, usize> = BTreeMap::new();
        for r in receipts {
            let name = match r.merchant_name.trim() {
                "" => UNKNOWN_MERCHANT,
                n => n,
            };
            *merchants.entry(name).or_insert(0) += 1;
        }
        let mut merchants_top: Vec<(String, usize)> = merchants
            .into_iter()
            .map(|(m, n)| (m.to_string(), n))
            .collect();
        merchants_top.sort_by(|a, b| b.1.cmp(&a.1));
        merchants_top.truncate(TOP_MERCHANTS);

        let dates: Vec<_> = receipts
            .iter()
            .filter_map(|r| parse_date(&r.transaction_date))
            .collect();
        let fmt = |d: Option<&chrono::NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        };
        let date_range = DateRange {
            min: fmt(dates.iter().min()),
            max: fmt(dates.iter().max()),
        };

        Self {
            file_count: files_found.len(),
            files_found,
            receipt_count: receipts.len(),
            merchants_top,
            date_range,
            sample_receipt: receipts.first().cloned(),
        }
    }
}
