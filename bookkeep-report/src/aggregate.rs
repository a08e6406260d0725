//! Dashboard aggregations over loaded statements.
//!
//! Transactions are flattened into dated ledger rows; rows whose date cannot
//! be parsed are left out of the aggregates but stay in the raw statements.

use std::collections::BTreeMap;

use bookkeep_core::{parse_date, Statement};
use chrono::NaiveDate;
use serde::Serialize;

/// One transaction with its account, for aggregation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub account_number: String,
    pub description: String,
    pub deposit: f64,
    pub withdrawal: f64,
    pub running_balance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub deposit: f64,
    pub withdrawal: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub running_balance: f64,
}

/// Balance over time for one account, in that account's row order
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalanceSeries {
    pub account_number: String,
    pub name: String,
    pub points: Vec<BalancePoint>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Visualizations {
    pub monthly_summary: Vec<MonthlySummary>,
    pub balance_trends: Vec<BalanceSeries>,
}

/// Payload of the bank statements view
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatementsReport {
    pub statements: Vec<Statement>,
    pub visualizations: Visualizations,
}

impl StatementsReport {
    pub fn new(statements: Vec<Statement>) -> Self {
        let rows = flatten(&statements);
        let visualizations = Visualizations {
            monthly_summary: monthly_summary(&rows),
            balance_trends: balance_trends(&rows),
        };
        Self {
            statements,
            visualizations,
        }
    }
}

/// Flatten statements into dated rows, dropping unparseable dates
pub fn flatten(statements: &[Statement]) -> Vec<LedgerRow> {
    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for statement in statements {
        for account in &statement.accounts {
            for tx in &account.transactions {
                let Some(date) = parse_date(&tx.date) else {
                    dropped += 1;
                    continue;
                };
                rows.push(LedgerRow {
                    date,
                    account_number: account.account_number.clone(),
                    description: tx.description.clone(),
                    deposit: tx.deposit,
                    withdrawal: tx.withdrawal,
                    running_balance: tx.running_balance,
                });
            }
        }
    }

    if dropped > 0 {
        tracing::debug!("Left {} transaction(s) with unparseable dates out of aggregates", dropped);
    }
    rows
}

/// Deposits and withdrawals summed per calendar month, ascending
pub fn monthly_summary(rows: &[LedgerRow]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in rows {
        let entry = months
            .entry(row.date.format("%Y-%m").to_string())
            .or_insert((0.0, 0.0));
        entry.0 += row.deposit;
        entry.1 += row.withdrawal;
    }

    months
        .into_iter()
        .map(|(month, (deposit, withdrawal))| MonthlySummary {
            month,
            deposit,
            withdrawal,
        })
        .collect()
}

/// One series per account in order of first appearance; points are not
/// re-sorted by date
pub fn balance_trends(rows: &[LedgerRow]) -> Vec<BalanceSeries> {
    let mut series: Vec<BalanceSeries> = Vec::new();
    for row in rows {
        let point = BalancePoint {
            date: row.date,
            running_balance: row.running_balance,
        };
        match series.iter_mut().find(|s| s.account_number == row.account_number) {
            Some(s) => s.points.push(point),
            None => series.push(BalanceSeries {
                account_number: row.account_number.clone(),
                name: format!("Account {}", row.account_number),
                points: vec![point],
            }),
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookkeep_core::{Account, Transaction};

    fn tx(date: &str, deposit: f64, withdrawal: f64, balance: f64) -> Transaction {
        Transaction {
            date: date.to_string(),
            deposit,
            withdrawal,
            running_balance: balance,
            ..Default::default()
        }
    }

    fn statement(accounts: Vec<Account>) -> Statement {
        Statement {
            accounts,
            ..Default::default()
        }
    }

    fn account(number: &str, transactions: Vec<Transaction>) -> Account {
        Account {
            account_number: number.to_string(),
            transactions,
            ..Default::default()
        }
    }

    #[test]
    fn test_monthly_summary_groups_by_month() {
        let statements = vec![statement(vec![account(
            "1",
            vec![
                tx("2025-01-05", 10.0, 0.0, 10.0),
                tx("2025-01-20", 0.0, 4.0, 6.0),
                tx("not a date", 1000.0, 0.0, 1006.0),
            ],
        )])];

        let report = StatementsReport::new(statements);
        assert_eq!(
            report.visualizations.monthly_summary,
            vec![MonthlySummary {
                month: "2025-01".to_string(),
                deposit: 10.0,
                withdrawal: 4.0,
            }]
        );
        // still in the raw payload
        assert_eq!(report.statements[0].accounts[0].transactions.len(), 3);
    }

    #[test]
    fn test_months_sorted_ascending() {
        let statements = vec![statement(vec![account(
            "1",
            vec![
                tx("03/02/2025", 1.0, 0.0, 0.0),
                tx("2024-12-31", 2.0, 0.0, 0.0),
                tx("2025-01-15", 3.0, 0.0, 0.0),
            ],
        )])];
        let months: Vec<_> = monthly_summary(&flatten(&statements))
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-03"]);
    }

    #[test]
    fn test_balance_trends_keep_account_row_order() {
        let statements = vec![
            statement(vec![
                account(
                    "A",
                    vec![tx("2025-01-10", 0.0, 0.0, 5.0), tx("2025-01-01", 0.0, 0.0, 7.0)],
                ),
                account("B", vec![tx("2025-01-03", 0.0, 0.0, 1.0)]),
            ]),
            statement(vec![account("A", vec![tx("2025-02-01", 0.0, 0.0, 9.0)])]),
        ];

        let trends = balance_trends(&flatten(&statements));
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].account_number, "A");
        assert_eq!(trends[0].name, "Account A");
        let a: Vec<f64> = trends[0].points.iter().map(|p| p.running_balance).collect();
        assert_eq!(a, vec![5.0, 7.0, 9.0]);
        assert_eq!(trends[1].points.len(), 1);
    }

    #[test]
    fn test_empty_statements_give_empty_visualizations() {
        let report = StatementsReport::new(Vec::new());
        assert!(report.visualizations.monthly_summary.is_empty());
        assert!(report.visualizations.balance_trends.is_empty());
    }
}
