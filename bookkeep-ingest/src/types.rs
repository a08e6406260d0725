use std::fmt;
use std::path::PathBuf;

use bookkeep_core::Statement;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Document families the pipeline extracts and serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BankStatement,
    Receipt,
    Invoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::BankStatement,
        DocumentKind::Receipt,
        DocumentKind::Invoice,
    ];

    /// Sub-directory under both `input/` and `output/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::BankStatement => "bank_statements",
            DocumentKind::Receipt => "receipts",
            DocumentKind::Invoice => "invoices",
        }
    }

    /// Prebuilt model the document-AI service runs for this kind
    pub fn model_id(&self) -> &'static str {
        match self {
            DocumentKind::BankStatement => "prebuilt-bankStatement.us",
            DocumentKind::Receipt => "prebuilt-receipt",
            DocumentKind::Invoice => "prebuilt-invoice",
        }
    }

    /// Suffix of the structured JSON written per analyzed file
    pub fn output_suffix(&self) -> &'static str {
        match self {
            DocumentKind::BankStatement => "_bank_statement.json",
            DocumentKind::Receipt => "_receipt.json",
            DocumentKind::Invoice => "_invoice.json",
        }
    }
}

/// Which path produced a statement load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Structured,
    CsvFallback,
    Nothing,
}

/// Why a single file contributed nothing to a load
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("payload is {0}, expected an object or a list of objects")]
    UnexpectedPayload(&'static str),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no paired transactions file {0}")]
    MissingPair(String),

    #[error("summary has no data rows")]
    EmptySummary,
}

#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Best-effort batch result: whatever loaded, plus what was skipped and why
#[derive(Debug)]
pub struct Loaded<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Skipped>,
}

impl<T> Loaded<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        tracing::warn!("Skipping {}: {}", path.display(), reason);
        self.skipped.push(Skipped { path, reason });
    }
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one statement load
#[derive(Debug)]
pub struct LoadReport {
    pub source: DataSource,
    pub statements: Vec<Statement>,
    pub skipped: Vec<Skipped>,
}

impl LoadReport {
    /// True when every source came up empty ("no data found")
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn skipped_descriptions(&self) -> Vec<String> {
        self.skipped.iter().map(ToString::to_string).collect()
    }
}
