//! CSV fallback: rebuild statements from a summary/transactions export pair.
//!
//! `<stem>_summary.csv` holds one row per account (balances, holder, bank,
//! period). `<stem>_all_transactions.csv` holds every transaction across
//! those accounts, keyed loosely by `Account Number`.
//!
//! Known simplifications:
//! - summary rows with an empty account number all collect the transaction
//!   rows whose account number is empty, so two such accounts get the same rows
//! - statement metadata comes from the first summary row only

use std::path::{Path, PathBuf};

use bookkeep_core::coerce::{
    clean_cell, coerce_money, is_null_placeholder, parse_money, parse_period,
};
use bookkeep_core::{
    Account, RunningBalance, Statement, StatementMetadata, StatementPeriod, Transaction,
};
use csv::StringRecord;

use crate::layout::files_with_suffix;
use crate::types::{Loaded, SkipReason};

pub const SUMMARY_SUFFIX: &str = "_summary.csv";
pub const TRANSACTIONS_SUFFIX: &str = "_all_transactions.csv";

pub const REQUIRED_SUMMARY_COLUMNS: [&str; 6] = [
    "Client Name",
    "Bank Name",
    "Account Number",
    "Statement Period",
    "Beginning Balance",
    "Ending Balance",
];

/// Scan `candidate_dirs` in order for summary files and rebuild one
/// statement per usable pair. Never fails; bad pairs are skipped.
pub fn reconcile_csv_pairs(candidate_dirs: &[PathBuf]) -> Loaded<Statement> {
    let mut out = Loaded::new();

    for dir in candidate_dirs {
        if !dir.is_dir() {
            continue;
        }
        let summaries = match files_with_suffix(dir, SUMMARY_SUFFIX) {
            Ok(files) => files,
            Err(e) => {
                out.skip(dir.clone(), e.into());
                continue;
            }
        };

        for summary_path in summaries {
            match reconcile_pair(&summary_path, candidate_dirs) {
                Ok(statement) => {
                    tracing::info!(
                        "Rebuilt statement with {} account(s) from {}",
                        statement.accounts.len(),
                        summary_path.display()
                    );
                    out.items.push(statement);
                }
                Err(reason) => out.skip(summary_path, reason),
            }
        }
    }

    out
}

/// Rebuild a statement from one summary file and its paired transactions file
pub fn reconcile_pair(
    summary_path: &Path,
    candidate_dirs: &[PathBuf],
) -> Result<Statement, SkipReason> {
    let transactions_path = find_transactions_file(summary_path, candidate_dirs)?;

    let summary = CsvTable::read(summary_path)?;
    let transactions = CsvTable::read(&transactions_path)?;

    let missing: Vec<String> = REQUIRED_SUMMARY_COLUMNS
        .iter()
        .filter(|c| summary.column(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SkipReason::MissingColumns(missing));
    }

    build_statement(&summary, &transactions)
}

/// Same directory first, then each candidate directory in order
fn find_transactions_file(
    summary_path: &Path,
    candidate_dirs: &[PathBuf],
) -> Result<PathBuf, SkipReason> {
    let file_name = summary_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(SUMMARY_SUFFIX).unwrap_or(file_name);
    let wanted = format!("{stem}{TRANSACTIONS_SUFFIX}");

    let sibling = summary_path.with_file_name(&wanted);
    if sibling.is_file() {
        return Ok(sibling);
    }

    candidate_dirs
        .iter()
        .map(|d| d.join(&wanted))
        .find(|p| p.is_file())
        .ok_or(SkipReason::MissingPair(wanted))
}

fn build_statement(summary: &CsvTable, transactions: &CsvTable) -> Result<Statement, SkipReason> {
    let first = summary.rows.first().ok_or(SkipReason::EmptySummary)?;

    let cols = SummaryColumns::locate(summary);
    let tx_cols = TransactionColumns::locate(transactions);

    let accounts = summary
        .rows
        .iter()
        .map(|row| build_account(summary, row, &cols, transactions, &tx_cols))
        .collect();

    let (start_date, end_date) = parse_period(summary.cell(first, cols.period));

    Ok(Statement {
        metadata: StatementMetadata {
            account_holder: clean_cell(summary.cell(first, cols.client_name)),
            bank_name: clean_cell(summary.cell(first, cols.bank_name)),
            statement_period: StatementPeriod {
                start_date,
                end_date,
            },
        },
        accounts,
    })
}

fn build_account(
    summary: &CsvTable,
    row: &StringRecord,
    cols: &SummaryColumns,
    tx_table: &CsvTable,
    tx_cols: &TransactionColumns,
) -> Account {
    let account_number = clean_cell(summary.cell(row, cols.account_number));
    let beginning_balance = coerce_money(summary.cell(row, cols.beginning_balance));
    let ending_balance = coerce_money(summary.cell(row, cols.ending_balance));

    let mut balance = RunningBalance::new(beginning_balance);
    let transactions = tx_table
        .rows
        .iter()
        .filter(|tx| belongs_to(tx_table.cell(tx, tx_cols.account_number), &account_number))
        .map(|tx| {
            let deposit = coerce_money(tx_table.cell(tx, tx_cols.deposits));
            let withdrawal = coerce_money(tx_table.cell(tx, tx_cols.withdrawals));
            let explicit = parse_money(tx_table.cell(tx, tx_cols.running_balance));

            Transaction {
                date: clean_cell(tx_table.cell(tx, tx_cols.date)),
                description: clean_cell(tx_table.cell(tx, tx_cols.description)),
                deposit,
                withdrawal,
                running_balance: balance.apply(deposit, withdrawal, explicit),
                check_number: String::new(),
                category: String::new(),
            }
        })
        .collect();

    Account {
        account_number,
        account_type: String::new(),
        beginning_balance,
        ending_balance,
        transactions,
    }
}

/// Weak join: exact match on a known number, else the empty-number bucket
fn belongs_to(tx_account: &str, account_number: &str) -> bool {
    if account_number.is_empty() {
        is_null_placeholder(tx_account)
    } else {
        tx_account.trim() == account_number
    }
}

struct SummaryColumns {
    client_name: Option<usize>,
    bank_name: Option<usize>,
    account_number: Option<usize>,
    period: Option<usize>,
    beginning_balance: Option<usize>,
    ending_balance: Option<usize>,
}

impl SummaryColumns {
    fn locate(t: &CsvTable) -> Self {
        Self {
            client_name: t.column("Client Name"),
            bank_name: t.column("Bank Name"),
            account_number: t.column("Account Number"),
            period: t.column("Statement Period"),
            beginning_balance: t.column("Beginning Balance"),
            ending_balance: t.column("Ending Balance"),
        }
    }
}

/// Looked up, not required: an absent column reads as empty cells
struct TransactionColumns {
    account_number: Option<usize>,
    date: Option<usize>,
    description: Option<usize>,
    deposits: Option<usize>,
    withdrawals: Option<usize>,
    running_balance: Option<usize>,
}

impl TransactionColumns {
    fn locate(t: &CsvTable) -> Self {
        Self {
            account_number: t.column("Account Number"),
            date: t.column("Date"),
            description: t.column("Description"),
            deposits: t.column("Deposits"),
            withdrawals: t.column("Withdrawals"),
            running_balance: t.column("Running Balance"),
        }
    }
}

/// Header-addressed CSV rows
struct CsvTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    fn read(path: &Path) -> Result<Self, SkipReason> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            match result {
                Ok(record) => rows.push(record),
                // header is line 1
                Err(e) => tracing::warn!(
                    "Skipping malformed row {} in {}: {}",
                    i + 2,
                    path.display(),
                    e
                ),
            }
        }

        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cell<'a>(&self, row: &'a StringRecord, column: Option<usize>) -> &'a str {
        column.and_then(|i| row.get(i)).unwrap_or("")
    }
}
