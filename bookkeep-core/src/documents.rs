//! Receipt and invoice payloads written by the document-AI batch.

use serde::{Deserialize, Serialize};

use crate::coerce::{lenient_index, lenient_money, lenient_string};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Receipt {
    /// 1-based position within the analyzed file
    #[serde(default, deserialize_with = "lenient_index")]
    pub receipt_number: u32,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub doc_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_date: String,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default, deserialize_with = "lenient_money")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub tax: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub tip: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReceiptItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_money")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_money")]
    pub total_price: f64,
}

/// Invoice fields keep the provider's rendered text (`"$1,234.56"`);
/// amounts are coerced only when reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient_index")]
    pub invoice_number: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor_address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub due_date: String,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subtotal: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_tax: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_total: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InvoiceItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub quantity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit_price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub amount: String,
}
