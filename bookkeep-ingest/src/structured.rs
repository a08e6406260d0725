//! Loader for structured per-document JSON.
//!
//! Each `*_bank_statement.json` (and `*_receipt.json`, `*_invoice.json`) holds
//! either one document object or a list of them. A file that cannot be read
//! or parsed is logged and skipped; the rest of the directory still loads.

use std::fs;
use std::path::Path;

use bookkeep_core::{explicit_money, Invoice, Receipt, RunningBalance, Statement};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::layout::{files_with_suffix, OutputLayout};
use crate::types::{DocumentKind, Loaded, SkipReason};

type Parse<T> = fn(Value) -> Result<T, serde_json::Error>;

/// Load every `*<suffix>` file in `dir` into one flat list.
///
/// A missing directory is "no data", not an error.
pub fn load_documents<T: DeserializeOwned>(dir: &Path, suffix: &str) -> Loaded<T> {
    load_with(dir, suffix, serde_json::from_value)
}

fn load_with<T>(dir: &Path, suffix: &str, parse: Parse<T>) -> Loaded<T> {
    let mut out = Loaded::new();
    if !dir.is_dir() {
        tracing::debug!("No directory at {}", dir.display());
        return out;
    }

    let files = match files_with_suffix(dir, suffix) {
        Ok(files) => files,
        Err(e) => {
            out.skip(dir.to_path_buf(), e.into());
            return out;
        }
    };

    for path in files {
        match read_payload(&path, parse) {
            Ok(mut docs) => {
                tracing::debug!("Loaded {} document(s) from {}", docs.len(), path.display());
                out.items.append(&mut docs);
            }
            Err(reason) => out.skip(path, reason),
        }
    }

    out
}

/// One object or a list of objects, normalized to a list
fn read_payload<T>(path: &Path, parse: Parse<T>) -> Result<Vec<T>, SkipReason> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(parse)
            .collect::<Result<Vec<T>, _>>()?),
        Value::Object(_) => Ok(vec![parse(value)?]),
        Value::Null => Err(SkipReason::UnexpectedPayload("null")),
        Value::Bool(_) => Err(SkipReason::UnexpectedPayload("a bool")),
        Value::Number(_) => Err(SkipReason::UnexpectedPayload("a number")),
        Value::String(_) => Err(SkipReason::UnexpectedPayload("a string")),
    }
}

/// Statement with every running balance resolved: the file's own value when
/// it holds a readable number, otherwise folded from the account's
/// beginning balance.
fn statement_from_value(value: Value) -> Result<Statement, serde_json::Error> {
    let mut statement = Statement::deserialize(&value)?;
    let raw_accounts = value.get("accounts").and_then(Value::as_array);

    for (i, account) in statement.accounts.iter_mut().enumerate() {
        let raw_txs = raw_accounts
            .and_then(|accts| accts.get(i))
            .and_then(|acct| acct.get("transactions"))
            .and_then(Value::as_array);

        let mut balance = RunningBalance::new(account.beginning_balance);
        for (k, tx) in account.transactions.iter_mut().enumerate() {
            let explicit = raw_txs
                .and_then(|txs| txs.get(k))
                .and_then(|raw| explicit_money(raw.get("running_balance")));
            tx.running_balance = balance.apply(tx.deposit, tx.withdrawal, explicit);
        }
    }

    Ok(statement)
}

pub fn load_structured_statements(dir: &Path) -> Loaded<Statement> {
    load_with(dir, DocumentKind::BankStatement.output_suffix(), statement_from_value)
}

pub fn load_receipts(layout: &OutputLayout) -> Loaded<Receipt> {
    load_documents(&layout.receipts_dir(), DocumentKind::Receipt.output_suffix())
}

pub fn load_invoices(layout: &OutputLayout) -> Loaded<Invoice> {
    load_documents(&layout.invoices_dir(), DocumentKind::Invoice.output_suffix())
}
