//! bookkeep-core: canonical statement model and defensive value coercion

pub mod coerce;
pub mod documents;
pub mod statement;

pub use coerce::{
    coerce_money, coerce_money_value, explicit_money, parse_date, parse_money, parse_period,
};
pub use documents::{Invoice, InvoiceItem, Receipt, ReceiptItem};
pub use statement::{
    Account, RunningBalance, Statement, StatementMetadata, StatementPeriod, Transaction,
};
