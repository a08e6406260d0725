//! JSON payloads shared by the CLI commands and the HTTP routes.
//!
//! Every function is blocking (file I/O) and never fails: problems are
//! reported as `{"error": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use bookkeep_ingest::layout::files_with_suffix;
use bookkeep_ingest::{
    load_bank_statements_report, load_invoices, load_receipts, DocumentKind, OutputLayout,
};
use bookkeep_report::{
    categorize, CategorizeInput, CategoryResult, InvoicesReport, ReceiptDebug, ReceiptQuery,
    ReceiptsReport, StatementDebug, StatementsReport,
};

pub const NO_STATEMENTS: &str = "No bank statement data found";
pub const NO_RECEIPTS: &str = "No receipt data found";
pub const NO_INVOICES: &str = "No invoice data found";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorizeRequest {
    pub transactions: Vec<CategorizeInput>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub use_llm: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorizeResponse {
    pub results: Vec<CategoryResult>,
}

pub fn error(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

fn payload<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| error(format!("serialize response: {e}")))
}

pub fn bank_statements(layout: &OutputLayout) -> Value {
    let report = load_bank_statements_report(layout);
    if report.is_empty() {
        return error(NO_STATEMENTS);
    }
    tracing::info!(
        "Serving {} statement(s) from {:?} source",
        report.statements.len(),
        report.source
    );
    payload(&StatementsReport::new(report.statements))
}

pub fn receipts(layout: &OutputLayout, query: &ReceiptQuery) -> Value {
    let loaded = load_receipts(layout);
    if loaded.items.is_empty() {
        return error(NO_RECEIPTS);
    }
    payload(&ReceiptsReport::new(loaded.items, query))
}

pub fn invoices(layout: &OutputLayout) -> Value {
    let loaded = load_invoices(layout);
    if loaded.items.is_empty() {
        return error(NO_INVOICES);
    }
    payload(&InvoicesReport::new(loaded.items))
}

pub fn debug_statements(layout: &OutputLayout) -> Value {
    let report = load_bank_statements_report(layout);
    let mut out = payload(&StatementDebug::new(&report.statements));
    if let Value::Object(map) = &mut out {
        map.insert("source".to_string(), json!(report.source));
        map.insert("skipped".to_string(), json!(report.skipped_descriptions()));
    }
    out
}

pub fn debug_receipts(layout: &OutputLayout) -> Value {
    let dir = layout.receipts_dir();
    let files = match files_with_suffix(&dir, DocumentKind::Receipt.output_suffix()) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("Could not list {}: {}", dir.display(), e);
            Vec::new()
        }
    };
    let loaded = load_receipts(layout);
    payload(&ReceiptDebug::new(&files, &loaded.items))
}

/// Falls back to `default_categories` when the request names none
pub fn categorize_request(request: &CategorizeRequest, default_categories: &[String]) -> Value {
    let categories = request
        .categories
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or(default_categories);
    let results = categorize(&request.transactions, Some(categories), request.use_llm);
    payload(&CategorizeResponse { results })
}
