//! Loose decoding of JSON fields produced by the dashboard and the ETL process.
//!
//! Numbers arrive as strings, flags as `1`/`"true"`/`"X"`, and missing values as
//! `null` or `""`. These helpers accept all of them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Return the first of `names` present (and not null) on `row`, else `Value::Null`.
pub fn field<'a>(row: &'a Value, names: &[&str]) -> &'a Value {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .find(|v| !v.is_null())
        .unwrap_or(&Value::Null)
}

#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[must_use]
pub fn opt_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Integer value; fractional input is rounded.
#[must_use]
pub fn opt_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}

/// Text value with surrounding whitespace removed; empty strings become `None`.
#[must_use]
pub fn opt_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Serde adapter for [`truthy`].
pub fn de_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().is_some_and(truthy))
}

/// Serde adapter for [`opt_f64`].
pub fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().and_then(opt_f64))
}

/// Serde adapter for [`opt_text`].
pub fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().and_then(opt_text))
}

/// Serde adapter for [`opt_i64`].
pub fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(|v| v.as_ref().and_then(opt_i64))
}
