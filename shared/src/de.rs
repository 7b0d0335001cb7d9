//! Lenient deserializers for backend payloads
//!
//! The backend is loose with types: numbers arrive as strings, ids as
//! numbers, flags as `0`/`1`. Malformed values degrade to defaults instead of
//! failing the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::util::parse_number_text;

/// Interpret an arbitrary JSON value as a number; `None` if it is not one.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_text(s),
        _ => None,
    }
}

/// Interpret an arbitrary JSON value as text; numbers are rendered.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Interpret an arbitrary JSON value as a flag (`true`, `1`, `"1"`, `"true"`).
pub fn value_as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true"),
        _ => false,
    }
}

/// Number or numeric string; anything else becomes `0.0`.
pub fn f64_lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

/// Like [`f64_lenient`] but keeps absence distinguishable.
pub fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

/// Non-negative whole quantity; fractions truncate, negatives and junk become 0.
pub fn u32_lenient<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value)
        .filter(|v| *v > 0.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}

/// Text or number rendered as text; null becomes empty.
pub fn string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_string(&value).unwrap_or_default())
}

/// Text or number rendered as text, keeping null as `None`.
pub fn opt_string_lenient<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_string(&value))
}

/// Boolean flag in any of the shapes the backend uses.
pub fn bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_bool(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "f64_lenient")]
        price: f64,
        #[serde(default, deserialize_with = "u32_lenient")]
        qty: u32,
        #[serde(default, deserialize_with = "string_lenient")]
        id: String,
        #[serde(default, deserialize_with = "bool_lenient")]
        flag: bool,
        #[serde(default, deserialize_with = "opt_f64_lenient")]
        unit: Option<f64>,
    }

    #[test]
    fn test_numbers_and_strings() {
        let p: Row =
            serde_json::from_str(r#"{"price":"12,5","qty":"3","id":42,"flag":1,"unit":"2.5"}"#)
                .unwrap();
        assert_eq!(p.price, 12.5);
        assert_eq!(p.qty, 3);
        assert_eq!(p.id, "42");
        assert!(p.flag);
        assert_eq!(p.unit, Some(2.5));
    }

    #[test]
    fn test_malformed_degrades() {
        let p: Row =
            serde_json::from_str(r#"{"price":"abc","qty":-4,"id":null,"flag":"no","unit":""}"#)
                .unwrap();
        assert_eq!(p.price, 0.0);
        assert_eq!(p.qty, 0);
        assert_eq!(p.id, "");
        assert!(!p.flag);
        assert_eq!(p.unit, None);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let p: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(p.price, 0.0);
        assert_eq!(p.qty, 0);
        assert!(p.id.is_empty());
        assert_eq!(p.unit, None);
    }

    #[test]
    fn test_fractional_quantity_truncates() {
        let p: Row = serde_json::from_str(r#"{"qty":2.9}"#).unwrap();
        assert_eq!(p.qty, 2);
    }
}
