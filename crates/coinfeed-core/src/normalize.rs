//! Defensive field extraction over parsed upstream JSON.
//!
//! Every accessor is total: a missing field, a `null`, or a value of the wrong
//! JSON type yields the documented default instead of an error. The record
//! builders lean on this to tolerate both upstream response shapes without
//! branching on every leaf.
//!
//! | Accessor | Missing / non-numeric |
//! |----------|-----------------------|
//! | [`text`] | `""` |
//! | [`decimal`] | `0` |
//! | [`integer`] | `0` |
//! | [`integer_or`] | caller default |

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Number, Value};
use tracing::warn;

/// Parses a raw response body into a JSON tree.
pub fn parse_document(body: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(body)
}

/// Returns a nested object section, or `None` when absent, `null`, or not an object.
pub fn section<'a>(node: &'a Value, field: &str) -> Option<&'a Value> {
    node.get(field).filter(|value| value.is_object())
}

/// Text value of `field`; scalars are rendered, anything else is empty.
pub fn text(node: &Value, field: &str) -> String {
    match node.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => String::new(),
    }
}

/// Exact decimal value of `field`, or zero.
///
/// Numbers the decimal type cannot hold (magnitudes above ~7.9e28) also become
/// zero, with a warning carrying the literal.
pub fn decimal(node: &Value, field: &str) -> Decimal {
    match node.get(field) {
        Some(Value::Number(number)) => decimal_from_number(number).unwrap_or_else(|| {
            warn!(field, literal = %number, "number outside the decimal range; using zero");
            Decimal::ZERO
        }),
        _ => Decimal::ZERO,
    }
}

/// Integer value of `field`, or zero.
pub fn integer(node: &Value, field: &str) -> i64 {
    integer_or(node, field, 0)
}

/// Integer value of `field`, or `default`. Fractional values are truncated toward zero.
pub fn integer_or(node: &Value, field: &str, default: i64) -> i64 {
    let Some(Value::Number(number)) = node.get(field) else {
        return default;
    };

    if let Some(value) = number.as_i64() {
        return value;
    }
    if number.as_u64().is_some() {
        return i64::MAX;
    }
    match number.as_f64() {
        Some(value) if value.is_finite() => value.trunc() as i64,
        _ => default,
    }
}

/// Converts a JSON number to a decimal from its textual form, never via `f64`.
///
/// Returns `None` when the value does not fit the decimal range.
pub fn decimal_from_number(number: &Number) -> Option<Decimal> {
    let literal = number.to_string();
    if literal.contains(['e', 'E']) {
        return Decimal::from_scientific(&literal).ok();
    }

    Decimal::from_str_exact(&literal)
        .or_else(|_| Decimal::from_str(&literal))
        .ok()
}
