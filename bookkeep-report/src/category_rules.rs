//! Deterministic category rules for bank transactions.
//!
//! Description keywords first, then a deposit rule, then the catch-all.

use bookkeep_core::coerce::{lenient_money, lenient_string};
use bookkeep_core::Transaction;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Meals & Entertainment",
    "Travel",
    "Office Supplies",
    "Software & Subscriptions",
    "Utilities",
    "Income",
    "Transfers",
    "Other",
];

/// Checked in order; the first keyword whose category is allowed wins.
const KEYWORD_MAP: [(&str, &str); 10] = [
    ("STARBUCKS", "Meals & Entertainment"),
    ("UBER", "Travel"),
    ("LYFT", "Travel"),
    ("AMZN", "Office Supplies"),
    ("AMAZON", "Office Supplies"),
    ("MICROSOFT", "Software & Subscriptions"),
    ("SUBSCRIPTION", "Software & Subscriptions"),
    ("WIRE IN", "Income"),
    ("ACH IN", "Income"),
    ("TRANSFER", "Transfers"),
];

const RATIONALE: &str = "Keyword/amount-based heuristic";

/// What the rules look at. Accepts both the canonical transaction fields
/// (`deposit`) and the plural spelling (`deposits`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CategorizeInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, alias = "deposit", deserialize_with = "lenient_money")]
    pub deposits: f64,
    #[serde(default, alias = "withdrawal", deserialize_with = "lenient_money")]
    pub withdrawals: f64,
}

impl From<&Transaction> for CategorizeInput {
    fn from(tx: &Transaction) -> Self {
        Self {
            description: tx.description.clone(),
            deposits: tx.deposit,
            withdrawals: tx.withdrawal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryResult {
    pub category: String,
    pub confidence: f64,
    pub rationale: String,
}

/// Categorize each input, preserving order. `None` or an empty list means
/// the default categories. `use_llm` is accepted but the rules always decide;
/// see [`build_llm_prompt`] for the prompt a model would receive.
pub fn categorize(
    transactions: &[CategorizeInput],
    categories: Option<&[String]>,
    use_llm: bool,
) -> Vec<CategoryResult> {
    let allowed: Vec<String> = match categories {
        Some(c) if !c.is_empty() => c.to_vec(),
        _ => DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    };
    if use_llm {
        tracing::debug!("LLM categorization requested; using keyword rules");
    }

    transactions
        .iter()
        .map(|tx| {
            let category = categorize_one(tx, &allowed);
            let confidence = if category == "Other" { 0.4 } else { 0.65 };
            CategoryResult {
                category,
                confidence,
                rationale: RATIONALE.to_string(),
            }
        })
        .collect()
}

fn categorize_one(tx: &CategorizeInput, allowed: &[String]) -> String {
    let is_allowed = |c: &str| allowed.iter().any(|a| a == c);
    let desc = tx.description.to_uppercase();

    if let Some((_, cat)) = KEYWORD_MAP
        .iter()
        .find(|&&(kw, cat)| desc.contains(kw) && is_allowed(cat))
    {
        return cat.to_string();
    }

    if tx.deposits > 0.0 && is_allowed("Income") {
        return "Income".to_string();
    }
    if is_allowed("Other") {
        return "Other".to_string();
    }
    allowed.first().cloned().unwrap_or_default()
}

/// Prompt asking a language model for the same `{category, confidence, rationale}` shape
pub fn build_llm_prompt(transactions: &[CategorizeInput], categories: &[String]) -> String {
    let listing = serde_json::to_string(transactions).unwrap_or_default();
    format!(
        "Categorize the following transactions into one of these categories: {}.\n\
         Return JSON list with objects {{category, confidence, rationale}}.\n\n\
         Transactions:\n{}",
        categories.join(", "),
        listing
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(desc: &str, deposits: f64) -> CategorizeInput {
        CategorizeInput {
            description: desc.to_string(),
            deposits,
            withdrawals: 0.0,
        }
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let out = categorize(&[input("Starbucks #1234 Seattle", 0.0)], None, false);
        assert_eq!(out[0].category, "Meals & Entertainment");
        assert_eq!(out[0].confidence, 0.65);
    }

    #[test]
    fn test_positive_deposit_falls_back_to_income() {
        let out = categorize(&[input("MOBILE DEPOSIT", 250.0)], None, false);
        assert_eq!(out[0].category, "Income");
    }

    #[test]
    fn test_unmatched_is_other_with_low_confidence() {
        let out = categorize(&[input("CHECK 1042", 0.0)], None, false);
        assert_eq!(out[0].category, "Other");
        assert_eq!(out[0].confidence, 0.4);
    }

    #[test]
    fn test_disallowed_keyword_category_is_skipped() {
        let cats = vec!["Transfers".to_string(), "Misc".to_string()];
        // UBER maps to Travel, which isn't allowed; TRANSFER is
        let out = categorize(&[input("UBER TRANSFER", 0.0)], Some(cats.as_slice()), false);
        assert_eq!(out[0].category, "Transfers");

        let out = categorize(&[input("LUNCH", 0.0)], Some(cats.as_slice()), false);
        assert_eq!(out[0].category, "Transfers");
        assert_eq!(out[0].confidence, 0.65);
    }

    #[test]
    fn test_empty_category_list_uses_defaults() {
        let out = categorize(&[input("AMZN MKTP", 0.0)], Some(&[][..]), true);
        assert_eq!(out[0].category, "Office Supplies");
    }

    #[test]
    fn test_order_and_length_preserved() {
        let txs = vec![input("UBER", 0.0), input("x", 0.0), input("ACH IN PAYROLL", 0.0)];
        let cats: Vec<_> = categorize(&txs, None, false)
            .into_iter()
            .map(|r| r.category)
            .collect();
        assert_eq!(cats, vec!["Travel", "Other", "Income"]);
    }

    #[test]
    fn test_input_accepts_either_spelling() {
        let a: CategorizeInput =
            serde_json::from_str(r#"{"description":"x","deposit":"$1,000.00"}"#).unwrap();
        let b: CategorizeInput =
            serde_json::from_str(r#"{"description":"x","deposits":1000}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_statement_transaction() {
        let tx = Transaction {
            description: "Lyft ride".to_string(),
            withdrawal: 18.5,
            ..Default::default()
        };
        let out = categorize(&[CategorizeInput::from(&tx)], None, false);
        assert_eq!(out[0].category, "Travel");
    }

    #[test]
    fn test_prompt_lists_categories() {
        let cats = vec!["Travel".to_string(), "Other".to_string()];
        let prompt = build_llm_prompt(&[input("UBER", 0.0)], &cats);
        assert!(prompt.contains("categories: Travel, Other."));
        assert!(prompt.contains("\"description\":\"UBER\""));
    }
}
