//! bookkeep-ingest: statement loading (structured JSON, CSV fallback) and
//! document-AI batch extraction.

pub mod batch;
pub mod csv_pair;
pub mod layout;
pub mod orchestrator;
pub mod provider;
pub mod structured;
pub mod types;

pub use batch::{BatchProcessor, BatchSummary, DocumentAnalyzer, ServiceError};
pub use layout::OutputLayout;
pub use orchestrator::{load_bank_statements, load_bank_statements_report};
pub use provider::{AnalyzedDocument, AnalyzedDocuments, FieldTree};
pub use structured::{load_invoices, load_receipts};
pub use types::{DataSource, DocumentKind, LoadReport, Loaded, SkipReason, Skipped};
