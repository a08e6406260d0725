//! Batch extraction: scanned files in, structured JSON out.
//!
//! For one document kind, every supported file under `input/<kind>/` is sent
//! to a [`DocumentAnalyzer`], mapped onto the canonical model and written to
//! `output/<kind>/<stem><suffix>`. The provider's raw result goes next to it
//! as `<stem>_raw.json`. A failure on one file is recorded in the
//! batch summary and the run moves on to the next file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::OutputLayout;
use crate::provider::{
    invoice_from_fields, receipt_from_fields, statement_from_fields, AnalyzedDocuments,
};
use crate::types::DocumentKind;

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "tiff", "tif"];

/// Failure reported by the document-AI collaborator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("document-AI is not configured: {0}")]
    NotConfigured(String),

    #[error("document-AI request failed: {0}")]
    Transport(String),

    #[error("document-AI rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("document analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("document analysis still running after {polls} polls")]
    TimedOut { polls: u32 },

    #[error("malformed document-AI response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Worth retrying later (network trouble, throttling, server-side errors)
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Transport(_) | ServiceError::TimedOut { .. } => true,
            ServiceError::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Synchronous document-understanding call
pub trait DocumentAnalyzer {
    fn analyze(&self, kind: DocumentKind, bytes: &[u8]) -> Result<AnalyzedDocuments, ServiceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessedFile {
    pub input_file: String,
    pub output_file: String,
    pub raw_output_file: String,
    pub status: String,
    pub documents: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
    pub transient: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
    pub timestamp: String,
}

pub struct BatchProcessor<'a> {
    analyzer: &'a dyn DocumentAnalyzer,
    input_dir: PathBuf,
    output: OutputLayout,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        analyzer: &'a dyn DocumentAnalyzer,
        input_dir: impl Into<PathBuf>,
        output: OutputLayout,
    ) -> Self {
        Self {
            analyzer,
            input_dir: input_dir.into(),
            output,
        }
    }

    /// Process every supported file of one kind and write the batch summary
    pub fn process(&self, kind: DocumentKind) -> Result<BatchSummary> {
        let started = Local::now();
        let out_dir = self.output.dir_for(kind);
        fs::create_dir_all(&out_dir).with_context(|| format!("create {}", out_dir.display()))?;

        let files = self.input_files(kind)?;
        tracing::info!("Processing {} {} file(s)", files.len(), kind.dir_name());

        let mut summary = BatchSummary {
            processed: Vec::new(),
            failed: Vec::new(),
            timestamp: started.to_rfc3339(),
        };

        for path in files {
            match self.process_file(kind, &path, &out_dir) {
                Ok(written) => {
                    tracing::info!("Wrote {}", written.output_file.display());
                    summary.processed.push(ProcessedFile {
                        input_file: path.display().to_string(),
                        output_file: written.output_file.display().to_string(),
                        raw_output_file: written.raw_output_file.display().to_string(),
                        status: "success".to_string(),
                        documents: written.documents,
                    });
                }
                Err(e) => {
                    let transient = e
                        .downcast_ref::<ServiceError>()
                        .is_some_and(ServiceError::is_transient);
                    tracing::warn!("Failed to process {}: {:#}", path.display(), e);
                    summary.failed.push(FailedFile {
                        file: path.display().to_string(),
                        error: format!("{e:#}"),
                        transient,
                    });
                }
            }
        }

        let summary_path = out_dir.join(format!(
            "batch_summary_{}.json",
            started.format("%Y%m%d_%H%M%S")
        ));
        let json = serde_json::to_string_pretty(&summary).context("serialize batch summary")?;
        fs::write(&summary_path, json)
            .with_context(|| format!("write {}", summary_path.display()))?;

        Ok(summary)
    }

    /// Supported files under `input/<kind>/`, sorted; no directory means no files
    fn input_files(&self, kind: DocumentKind) -> Result<Vec<PathBuf>> {
        let dir = self.input_dir.join(kind.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let entries = fs::read_dir(&dir).with_context(|| format!("list {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_supported(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn process_file(&self, kind: DocumentKind, path: &Path, out_dir: &Path) -> Result<Written> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let analyzed = self.analyzer.analyze(kind, &bytes)?;
        let count = analyzed.documents.len();

        let json = match kind {
            DocumentKind::BankStatement => {
                let statements: Vec<_> = analyzed
                    .documents
                    .iter()
                    .map(|d| statement_from_fields(&d.fields))
                    .collect();
                serde_json::to_string_pretty(&statements)?
            }
            DocumentKind::Receipt => {
                let receipts: Vec<_> = analyzed
                    .documents
                    .iter()
                    .enumerate()
                    .map(|(i, d)| receipt_from_fields(i, d))
                    .collect();
                serde_json::to_string_pretty(&receipts)?
            }
            DocumentKind::Invoice => {
                let invoices: Vec<_> = analyzed
                    .documents
                    .iter()
                    .enumerate()
                    .map(|(i, d)| invoice_from_fields(i, &d.fields))
                    .collect();
                serde_json::to_string_pretty(&invoices)?
            }
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("input file has no usable name")?;
        let output_file = out_dir.join(format!("{stem}{}", kind.output_suffix()));
        fs::write(&output_file, json)
            .with_context(|| format!("write {}", output_file.display()))?;

        let raw_output_file = out_dir.join(format!("{stem}_raw.json"));
        let raw = serde_json::to_string_pretty(&analyzed.raw)?;
        fs::write(&raw_output_file, raw)
            .with_context(|| format!("write {}", raw_output_file.display()))?;

        Ok(Written {
            output_file,
            raw_output_file,
            documents: count,
        })
    }
}

/// Files written for one successful input
struct Written {
    output_file: PathBuf,
    raw_output_file: PathBuf,
    documents: usize,
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.as_str()))
}
