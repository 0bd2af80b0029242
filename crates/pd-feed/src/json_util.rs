//! JSON parsing helpers for push-channel payloads.
//!
//! Upstream feeds encode prices as either JSON strings (`"810.25"`) or native
//! numbers (`810.25`), occasionally in scientific notation.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a JSON value (string or number) as [`Decimal`].
#[inline]
pub fn parse_str_decimal(v: Option<&serde_json::Value>) -> Option<Decimal> {
    let v = v?;
    let text = match v {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()
}

/// Parse the first present field among `keys` as [`Decimal`].
#[inline]
pub fn parse_decimal_field(v: &serde_json::Value, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|k| parse_str_decimal(v.get(*k)))
}
