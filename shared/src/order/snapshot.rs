//! Tab snapshot - authoritative tab state pushed by the backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::types::OrderLine;
use crate::de::{f64_lenient, string_lenient, value_as_string};

/// Recomputed state of one tab ("comanda")
///
/// Every snapshot fully replaces what the client holds for that tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabSnapshot {
    #[serde(rename = "comanda", default, deserialize_with = "string_lenient")]
    pub tab_id: String,
    #[serde(rename = "dados", default, deserialize_with = "lines_lenient")]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "preco_pago", default, deserialize_with = "f64_lenient")]
    pub amount_paid: f64,
    #[serde(rename = "preco_a_pagar", default, deserialize_with = "f64_lenient")]
    pub amount_due: f64,
    #[serde(rename = "preco_total", default, deserialize_with = "f64_lenient")]
    pub amount_total: f64,
    /// Customers with lines on this tab
    #[serde(rename = "nomes", default, deserialize_with = "names_lenient")]
    pub names: Vec<String>,
}

impl TabSnapshot {
    pub fn empty(tab_id: impl Into<String>) -> Self {
        Self {
            tab_id: tab_id.into(),
            ..Self::default()
        }
    }
}

/// Lines array; entries that are not objects are dropped, a non-array is empty.
pub fn lines_lenient<'de, D>(deserializer: D) -> Result<Vec<OrderLine>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lines_from_value(value))
}

pub(crate) fn lines_from_value(value: Value) -> Vec<OrderLine> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(line) => Some(line),
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed order line");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn names_lenient<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| match v {
                Value::Object(map) => map.get("nome").and_then(value_as_string),
                other => value_as_string(other),
            })
            .filter(|name| !name.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
