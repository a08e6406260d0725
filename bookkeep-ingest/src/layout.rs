//! Where extracted documents live on disk.
//!
//! ```text
//! output/
//!   bank_statements/  *_bank_statement.json, *_summary.csv, *_all_transactions.csv
//!   receipts/         *_receipt.json
//!   invoices/         *_invoice.json
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::DocumentKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir_for(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn bank_statements_dir(&self) -> PathBuf {
        self.dir_for(DocumentKind::BankStatement)
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.dir_for(DocumentKind::Receipt)
    }

    pub fn invoices_dir(&self) -> PathBuf {
        self.dir_for(DocumentKind::Invoice)
    }

    /// Directories searched for CSV pairs, in priority order
    pub fn csv_candidate_dirs(&self) -> Vec<PathBuf> {
        vec![self.bank_statements_dir(), self.root.clone()]
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new("output")
    }
}

/// Regular files in `dir` whose name ends with `suffix`, sorted by name.
///
/// Directory listing order is platform-dependent; sorting keeps repeated
/// loads identical.
pub fn files_with_suffix(dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(suffix));
        if matches && path.is_file() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
