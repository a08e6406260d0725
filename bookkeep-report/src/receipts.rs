//! Receipt filtering and per-merchant spend summary.

use std::collections::BTreeMap;

use bookkeep_core::{parse_date, Receipt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_MERCHANT: &str = "Unknown";
const TOP_MERCHANTS: usize = 15;

/// Raw filter values as they arrive from a query string or CLI flags
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReceiptQuery {
    pub merchant: String,
    pub start_date: String,
    pub end_date: String,
    pub min_total: String,
    pub max_total: String,
}

impl ReceiptQuery {
    /// Trimmed copy, echoed back as `filters_applied`
    pub fn trimmed(&self) -> Self {
        Self {
            merchant: self.merchant.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
            min_total: self.min_total.trim().to_string(),
            max_total: self.max_total.trim().to_string(),
        }
    }
}

/// Parsed filters. A value that does not parse is ignored rather than
/// rejecting the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptFilter {
    merchant: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    min_total: Option<f64>,
    max_total: Option<f64>,
}

impl ReceiptFilter {
    pub fn from_query(query: &ReceiptQuery) -> Self {
        let q = query.trimmed();
        Self {
            merchant: Some(q.merchant.to_lowercase()).filter(|m| !m.is_empty()),
            start: parse_date(&q.start_date),
            end: parse_date(&q.end_date),
            min_total: q.min_total.parse().ok(),
            max_total: q.max_total.parse().ok(),
        }
    }

    /// Date bounds drop receipts whose own date is unreadable
    pub fn matches(&self, receipt: &Receipt) -> bool {
        if let Some(m) = &self.merchant {
            if !receipt.merchant_name.to_lowercase().contains(m.as_str()) {
                return false;
            }
        }

        if self.start.is_some() || self.end.is_some() {
            let Some(date) = parse_date(&receipt.transaction_date) else {
                return false;
            };
            if self.start.is_some_and(|s| date < s) || self.end.is_some_and(|e| date > e) {
                return false;
            }
        }

        if self.min_total.is_some_and(|min| receipt.total < min) {
            return false;
        }
        if self.max_total.is_some_and(|max| receipt.total > max) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MerchantSummary {
    pub merchant_name: String,
    pub receipts_count: usize,
    pub total_amount: f64,
    pub total_tax: f64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiptsVisualization {
    pub top_merchants: Vec<MerchantSummary>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiptsReport {
    pub receipts: Vec<Receipt>,
    pub grouped: Vec<MerchantSummary>,
    pub visualization: ReceiptsVisualization,
    pub filters_applied: ReceiptQuery,
}

impl ReceiptsReport {
    pub fn new(receipts: Vec<Receipt>, query: &ReceiptQuery) -> Self {
        let filter = ReceiptFilter::from_query(query);
        let filtered: Vec<Receipt> = receipts
            .into_iter()
            .map(normalize)
            .filter(|r| filter.matches(r))
            .collect();

        let grouped = group_by_merchant(&filtered);
        let top_merchants = grouped.iter().take(TOP_MERCHANTS).cloned().collect();

        Self {
            receipts: filtered,
            grouped,
            visualization: ReceiptsVisualization { top_merchants },
            filters_applied: query.trimmed(),
        }
    }
}

/// Unknown merchant name, ISO date (empty when unreadable)
fn normalize(mut receipt: Receipt) -> Receipt {
    if receipt.merchant_name.trim().is_empty() {
        receipt.merchant_name = UNKNOWN_MERCHANT.to_string();
    }
    receipt.transaction_date = parse_date(&receipt.transaction_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    receipt
}

/// Sorted by total spend, descending; ties in merchant-name order
pub fn group_by_merchant(receipts: &[Receipt]) -> Vec<MerchantSummary> {
    let mut groups: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for r in receipts {
        let g = groups.entry(r.merchant_name.as_str()).or_insert((0, 0.0, 0.0));
        g.0 += 1;
        g.1 += r.total;
        g.2 += r.tax;
    }

    let mut out: Vec<MerchantSummary> = groups
        .into_iter()
        .map(|(name, (count, total, tax))| MerchantSummary {
            merchant_name: name.to_string(),
            receipts_count: count,
            total_amount: total,
            total_tax: tax,
            avg_amount: total / count as f64,
        })
        .collect();
    out.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(merchant: &str, date: &str, total: f64, tax: f64) -> Receipt {
        Receipt {
            merchant_name: merchant.to_string(),
            transaction_date: date.to_string(),
            total,
            tax,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Receipt> {
        vec![
            receipt("Starbucks", "2025-01-05", 6.5, 0.5),
            receipt("Contoso", "2025-01-10", 100.0, 8.0),
            receipt("starbucks reserve", "01/20/2025", 12.0, 1.0),
            receipt("", "garbage", 3.0, 0.0),
        ]
    }

    #[test]
    fn test_no_filters_keeps_everything() {
        let report = ReceiptsReport::new(sample(), &ReceiptQuery::default());
        assert_eq!(report.receipts.len(), 4);
        assert_eq!(report.receipts[2].transaction_date, "2025-01-20");
        assert_eq!(report.receipts[3].merchant_name, UNKNOWN_MERCHANT);
        assert_eq!(report.receipts[3].transaction_date, "");
        assert_eq!(report.grouped[0].merchant_name, "Contoso");
    }

    #[test]
    fn test_merchant_filter_is_case_insensitive_substring() {
        let q = ReceiptQuery {
            merchant: " STARBUCKS ".to_string(),
            ..Default::default()
        };
        let report = ReceiptsReport::new(sample(), &q);
        assert_eq!(report.receipts.len(), 2);
        assert_eq!(report.filters_applied.merchant, "STARBUCKS");
    }

    #[test]
    fn test_date_and_total_filters() {
        let q = ReceiptQuery {
            start_date: "2025-01-06".to_string(),
            max_total: "50".to_string(),
            ..Default::default()
        };
        let report = ReceiptsReport::new(sample(), &q);
        let merchants: Vec<_> = report.receipts.iter().map(|r| r.merchant_name.as_str()).collect();
        assert_eq!(merchants, vec!["starbucks reserve"]);
    }

    #[test]
    fn test_unparseable_filter_values_are_ignored() {
        let q = ReceiptQuery {
            start_date: "someday".to_string(),
            min_total: "lots".to_string(),
            ..Default::default()
        };
        let report = ReceiptsReport::new(sample(), &q);
        assert_eq!(report.receipts.len(), 4);
    }

    #[test]
    fn test_group_by_merchant_totals() {
        let receipts = vec![
            receipt("A", "", 10.0, 1.0),
            receipt("B", "", 50.0, 5.0),
            receipt("A", "", 30.0, 3.0),
        ];
        let grouped = group_by_merchant(&receipts);
        assert_eq!(grouped[0].merchant_name, "B");
        assert_eq!(grouped[1].receipts_count, 2);
        assert_eq!(grouped[1].total_amount, 40.0);
        assert_eq!(grouped[1].total_tax, 4.0);
        assert_eq!(grouped[1].avg_amount, 20.0);
    }
}
