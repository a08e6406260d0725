//! bookkeep-report: dashboard aggregations, receipt/invoice reports,
//! debug summaries and transaction category rules

pub mod aggregate;
pub mod category_rules;
pub mod debug;
pub mod invoices;
pub mod receipts;

pub use aggregate::{StatementsReport, Visualizations};
pub use category_rules::{build_llm_prompt, categorize, CategorizeInput, CategoryResult};
pub use debug::{ReceiptDebug, StatementDebug};
pub use invoices::InvoicesReport;
pub use receipts::{ReceiptQuery, ReceiptsReport};
