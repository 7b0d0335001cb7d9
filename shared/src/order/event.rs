//! Tab events - state pushed by the backend

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::snapshot::{TabSnapshot, lines_lenient};
use super::types::OrderLine;
use crate::de::string_lenient;
use crate::models::MenuEntry;

/// Event received over the message channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum TabEvent {
    /// Authoritative recomputed tab
    #[serde(rename = "preco")]
    TabUpdated(TabSnapshot),
    /// The tab was closed (fully paid) or removed
    #[serde(rename = "comanda_deleted")]
    TabDeleted(TabDeleted),
    /// Error raised by the backend while handling a command
    #[serde(rename = "error")]
    Error(ServerError),
    /// Open order lines, answer to a list request
    #[serde(rename = "respostaPedidos")]
    OrdersListed(OrdersListed),
    /// Menu rows, answer to a menu request
    #[serde(rename = "respostaCardapio")]
    MenuListed(MenuListed),
    /// An item is running low after an order consumed stock
    #[serde(rename = "alerta_restantes")]
    StockAlert(StockAlert),
    /// Open and closed tabs, answer to a tab list request
    #[serde(rename = "respostaComandas")]
    TabsListed(TabsListed),
}

impl TabEvent {
    /// Tab this event is about, when it is about one
    pub fn tab_id(&self) -> Option<&str> {
        match self {
            Self::TabUpdated(s) => Some(&s.tab_id),
            Self::TabDeleted(d) => Some(&d.fcomanda),
            Self::Error(_)
            | Self::OrdersListed(_)
            | Self::MenuListed(_)
            | Self::StockAlert(_)
            | Self::TabsListed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabDeleted {
    #[serde(default, deserialize_with = "string_lenient")]
    pub fcomanda: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockAlert {
    #[serde(default, deserialize_with = "string_lenient")]
    pub item: String,
    /// Units left
    #[serde(default, deserialize_with = "crate::de::f64_lenient")]
    pub quantidade: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    #[serde(default, deserialize_with = "message_lenient")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersListed {
    #[serde(rename = "dataPedidos", default, deserialize_with = "lines_lenient")]
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuListed {
    #[serde(rename = "dataCardapio", default, deserialize_with = "items_lenient")]
    pub entries: Vec<MenuEntry>,
}

/// One row of the tab list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    #[serde(default, deserialize_with = "string_lenient")]
    pub comanda: String,
    /// Payment round of a closed tab; 0 for open tabs
    #[serde(default, deserialize_with = "crate::de::u32_lenient")]
    pub ordem: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsListed {
    #[serde(rename = "dados_comandaAberta", default, deserialize_with = "items_lenient")]
    pub open: Vec<TabEntry>,
    #[serde(rename = "dados_comandaFechada", default, deserialize_with = "items_lenient")]
    pub closed: Vec<TabEntry>,
}

/// Array of `T`; rows that do not read as `T` are skipped, anything but an
/// array is empty.
fn items_lenient<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn message_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
