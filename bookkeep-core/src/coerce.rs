//! Defensive coercion of money, date and period text.
//!
//! Extraction output and hand-exported CSVs disagree on formatting
//! (`"$1,234.56"`, `"1234.56"`, `" 12.0 "`, `null`, `"nan"`). Every helper here
//! is total: input that cannot be read becomes `0.0` or an empty string.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Cell values that mean "nothing here" once a CSV has been round-tripped
/// through a spreadsheet or a dataframe.
const NULL_PLACEHOLDERS: &[&str] = &["", "nan", "none", "null", "n/a", "na"];

/// Tried in order. chrono's `%Y` accepts any digit count, so month-first
/// layouts (two-digit years first) go before year-first ones; otherwise
/// `01/05/25` would parse as year 1.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

static ISO_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<date>\d{4}-\d{2}-\d{2})[T ]\d{2}:\d{2}").expect("static datetime pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Strict money parse: keep digits, `.` and `-`, then parse.
///
/// Returns `None` when nothing numeric is left or the remainder is not a
/// number (`"1.2.3"`, `"-"`). Parentheses do not make a value negative.
pub fn parse_money(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Money text to `f64`, `0.0` when unreadable.
pub fn coerce_money(text: &str) -> f64 {
    parse_money(text).unwrap_or(0.0)
}

/// Money from an arbitrary JSON value (number, currency string or null).
pub fn coerce_money_value(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => coerce_money(s),
        _ => 0.0,
    }
}

/// Money from a JSON value only when one is actually there: `None` for a
/// missing field, `null`, or text with no readable number (`"n/a"`, `"-"`).
pub fn explicit_money(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(s)) => parse_money(s),
        _ => None,
    }
}

/// Split `"<start> to <end>"` into trimmed parts.
///
/// Anything without the literal `" to "` separator yields two empty strings;
/// the parts are not validated as dates.
pub fn parse_period(text: &str) -> (String, String) {
    match text.split_once(" to ") {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (String::new(), String::new()),
    }
}

/// Best-effort calendar date from display text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = ISO_DATETIME.captures(&text) {
        return NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").ok();
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
}

pub fn is_null_placeholder(text: &str) -> bool {
    let t = text.trim().to_ascii_lowercase();
    NULL_PLACEHOLDERS.contains(&t.as_str())
}

/// Text cell with null placeholders folded to `""`.
pub fn clean_cell(text: &str) -> String {
    if is_null_placeholder(text) {
        String::new()
    } else {
        text.trim().to_string()
    }
}

/// `deserialize_with` helper: number, currency string or null into `f64`.
pub fn lenient_money<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_money_value(value.as_ref()))
}

/// `deserialize_with` helper: string, number, bool or null into `String`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(de::Error::custom(format!(
            "expected text, found {}",
            json_kind(&other)
        ))),
    }
}

/// `deserialize_with` helper for 1-based document indexes.
pub fn lenient_index<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let n = match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(n).unwrap_or(0))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_money_formats() {
        assert_eq!(coerce_money("$1,234.56"), 1234.56);
        assert_eq!(coerce_money("  12.0 "), 12.0);
        assert_eq!(coerce_money("-15.00"), -15.0);
        // parentheses are not read as a negative sign
        assert_eq!(coerce_money("(42.00)"), 42.0);
    }

    #[test]
    fn test_coerce_money_is_total() {
        for junk in ["", "abc", "-", "1.2.3", "$", "nan", "inf", "--5"] {
            let v = coerce_money(junk);
            assert!(v.is_finite(), "{junk:?} gave {v}");
            assert_eq!(v, 0.0, "{junk:?}");
        }
        assert_eq!(coerce_money_value(None), 0.0);
        assert_eq!(coerce_money_value(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_money_value(Some(&json!(true))), 0.0);
        assert_eq!(coerce_money_value(Some(&json!([1, 2]))), 0.0);
    }

    #[test]
    fn test_coerce_money_value_passthrough() {
        assert_eq!(coerce_money_value(Some(&json!(42))), 42.0);
        assert_eq!(coerce_money_value(Some(&json!(3.5))), 3.5);
        assert_eq!(coerce_money_value(Some(&json!("USD 7.25"))), 7.25);
    }

    #[test]
    fn test_parse_money_strict() {
        assert_eq!(parse_money("1,000.00"), Some(1000.0));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("n/a"), None);
        assert_eq!(parse_money("0"), Some(0.0));
    }

    #[test]
    fn test_explicit_money_needs_a_value() {
        assert_eq!(explicit_money(None), None);
        assert_eq!(explicit_money(Some(&Value::Null)), None);
        assert_eq!(explicit_money(Some(&json!("n/a"))), None);
        assert_eq!(explicit_money(Some(&json!("-"))), None);
        assert_eq!(explicit_money(Some(&json!(0))), Some(0.0));
        assert_eq!(explicit_money(Some(&json!("$1,050.00"))), Some(1050.0));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(
            parse_period("2025-01-01 to 2025-01-31"),
            ("2025-01-01".to_string(), "2025-01-31".to_string())
        );
        assert_eq!(
            parse_period("  Jan 1, 2025   to  Jan 31, 2025 "),
            ("Jan 1, 2025".to_string(), "Jan 31, 2025".to_string())
        );
        assert_eq!(parse_period("n/a"), (String::new(), String::new()));
        // "to" inside a word is not a separator
        assert_eq!(parse_period("October 2025"), (String::new(), String::new()));
    }

    #[test]
    fn test_parse_date_formats() {
        let jan5 = NaiveDate::from_ymd_opt(2025, 1, 5);
        assert_eq!(parse_date("2025-01-05"), jan5);
        assert_eq!(parse_date("2025-01-05T00:00:00"), jan5);
        assert_eq!(parse_date("2025-01-05 13:45:00"), jan5);
        assert_eq!(parse_date("01/05/2025"), jan5);
        assert_eq!(parse_date("01/05/25"), jan5);
        assert_eq!(parse_date("2025/01/05"), jan5);
        assert_eq!(parse_date("Jan 5, 2025"), jan5);
        assert_eq!(parse_date("January 5, 2025"), jan5);
        assert_eq!(parse_date("5 Jan 2025"), jan5);
        assert_eq!(parse_date(" 2025-01-05 "), jan5);
    }

    #[test]
    fn test_parse_date_rejects_junk() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2025-13-40"), None);
        assert_eq!(parse_date("nan"), None);
    }

    #[test]
    fn test_null_placeholders() {
        assert!(is_null_placeholder(""));
        assert!(is_null_placeholder(" NaN "));
        assert!(is_null_placeholder("None"));
        assert!(!is_null_placeholder("0"));
        assert_eq!(clean_cell(" nan "), "");
        assert_eq!(clean_cell(" 1234 "), "1234");
    }
}
