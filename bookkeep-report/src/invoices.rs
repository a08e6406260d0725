//! Invoice amounts per vendor.

use bookkeep_core::{coerce_money, Invoice};
use serde::Serialize;

use crate::receipts::UNKNOWN_MERCHANT;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VendorTotal {
    pub vendor_name: String,
    pub invoice_total_value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvoicesVisualization {
    pub vendor_totals: Vec<VendorTotal>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvoicesReport {
    pub invoices: Vec<Invoice>,
    pub visualization: InvoicesVisualization,
}

impl InvoicesReport {
    pub fn new(invoices: Vec<Invoice>) -> Self {
        let vendor_totals = vendor_totals(&invoices);
        Self {
            invoices,
            visualization: InvoicesVisualization { vendor_totals },
        }
    }
}

/// Sum of coerced `invoice_total` per vendor, in order of first appearance
pub fn vendor_totals(invoices: &[Invoice]) -> Vec<VendorTotal> {
    let mut totals: Vec<VendorTotal> = Vec::new();
    for inv in invoices {
        let name = match inv.vendor_name.trim() {
            "" => UNKNOWN_MERCHANT,
            n => n,
        };
        let amount = coerce_money(&inv.invoice_total);
        match totals.iter_mut().find(|t| t.vendor_name == name) {
            Some(t) => t.invoice_total_value += amount,
            None => totals.push(VendorTotal {
                vendor_name: name.to_string(),
                invoice_total_value: amount,
            }),
        }
    }
    totals
}
