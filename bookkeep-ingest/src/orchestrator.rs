//! Statement load entry point: structured JSON first, CSV pairs as fallback.

use bookkeep_core::Statement;

use crate::csv_pair::reconcile_csv_pairs;
use crate::layout::OutputLayout;
use crate::structured::load_structured_statements;
use crate::types::{DataSource, LoadReport};

/// Load every statement under `layout`.
///
/// Structured JSON takes strict priority: a single structured statement
/// suppresses the CSV fallback entirely. Never fails; an empty list means
/// nothing usable was found.
pub fn load_bank_statements(layout: &OutputLayout) -> Vec<Statement> {
    load_bank_statements_report(layout).statements
}

/// Same as [`load_bank_statements`], plus the source used and every skipped file
pub fn load_bank_statements_report(layout: &OutputLayout) -> LoadReport {
    let structured = load_structured_statements(&layout.bank_statements_dir());
    if !structured.items.is_empty() {
        tracing::info!(
            "Loaded {} structured statement(s) from {}",
            structured.items.len(),
            layout.bank_statements_dir().display()
        );
        return LoadReport {
            source: DataSource::Structured,
            statements: structured.items,
            skipped: structured.skipped,
        };
    }

    let fallback = reconcile_csv_pairs(&layout.csv_candidate_dirs());
    let mut skipped = structured.skipped;
    skipped.extend(fallback.skipped);

    let source = if fallback.items.is_empty() {
        tracing::info!("No bank statement data under {}", layout.root().display());
        DataSource::Nothing
    } else {
        tracing::info!("Loaded {} statement(s) from CSV pairs", fallback.items.len());
        DataSource::CsvFallback
    };

    LoadReport {
        source,
        statements: fallback.items,
        skipped,
    }
}
