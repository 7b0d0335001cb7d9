//! REST request/response types
//!
//! Field names follow the backend's endpoints; responses are parsed
//! leniently so that malformed data degrades instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::de::{f64_lenient, string_lenient, value_as_f64};
use crate::order::snapshot::lines_lenient;
use crate::order::{OrderLine, PaymentRecord};

// =============================================================================
// Stock
// =============================================================================

/// `POST verificar_quantidade`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCheckRequest {
    pub item: String,
    pub quantidade: u32,
}

/// Stock check answer: `erro` set means not enough units; `quantidade` is
/// what is left in stock either way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockCheckResponse {
    #[serde(default, deserialize_with = "error_flag")]
    pub erro: bool,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub quantidade: f64,
}

/// `erro` may be a bool, a number or a message; any truthy value counts.
fn error_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Bool(b) => *b,
        Value::Number(_) => value_as_f64(&value).is_some_and(|v| v != 0.0),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            !(s.is_empty() || s == "false" || s == "0")
        }
        Value::Null => false,
        _ => true,
    })
}

// =============================================================================
// Tab lines
// =============================================================================

/// `POST pegar_pedidos`: lines of a tab for one payment round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabLinesRequest {
    pub comanda: String,
    pub ordem: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabLinesResponse {
    #[serde(default, deserialize_with = "lines_lenient")]
    pub data: Vec<OrderLine>,
    /// Amount due for that round
    #[serde(default, deserialize_with = "f64_lenient")]
    pub preco: f64,
}

// =============================================================================
// Payments
// =============================================================================

/// `POST pegar_pagamentos_comanda`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryRequest {
    pub comanda: String,
}

/// Payment history; the backend answers with a bare array or wraps it under
/// `pagamentos` or `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaymentHistory(pub Vec<PaymentRecord>);

impl<'de> Deserialize<'de> for PaymentHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map
                .remove("pagamentos")
                .filter(Value::is_array)
                .or_else(|| map.remove("data").filter(Value::is_array))
            {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        Ok(Self(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ))
    }
}

impl PaymentHistory {
    pub fn total(&self) -> f64 {
        self.0.iter().map(|p| p.amount).sum()
    }
}

/// `POST excluir_pagamento`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePaymentRequest {
    #[serde(deserialize_with = "string_lenient")]
    pub comanda: String,
    #[serde(deserialize_with = "string_lenient")]
    pub pagamento_id: String,
}
