//! Menu entries as served by the backend and their normalized form

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::option::OptionGroup;
use crate::de::{f64_lenient, string_lenient};

/// Menu category, stored by the backend as a small number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Category {
    /// Everything that is neither drink nor kitchen dish (1)
    Restante,
    /// Drinks, routed to the bar (2)
    Bebida,
    /// Dishes prepared in the kitchen (3)
    Porcao,
    Other(i64),
}

impl Category {
    pub fn id(&self) -> i64 {
        match self {
            Self::Restante => 1,
            Self::Bebida => 2,
            Self::Porcao => 3,
            Self::Other(id) => *id,
        }
    }

    /// Parse the category as it appears on order lines (`"3"`, `3`, missing)
    pub fn from_value(value: &Value) -> Option<Self> {
        crate::de::value_as_f64(value).map(|v| Self::from(v as i64))
    }
}

impl From<i64> for Category {
    fn from(id: i64) -> Self {
        match id {
            1 => Self::Restante,
            2 => Self::Bebida,
            3 => Self::Porcao,
            other => Self::Other(other),
        }
    }
}

impl From<Category> for i64 {
    fn from(category: Category) -> Self {
        category.id()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restante => write!(f, "Restante"),
            Self::Bebida => write!(f, "Bebida"),
            Self::Porcao => write!(f, "Porção"),
            Self::Other(id) => write!(f, "Categoria {id}"),
        }
    }
}

/// Raw menu row; `opcoes` is whatever the backend stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    #[serde(default, deserialize_with = "string_lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub item: String,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub preco: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub categoria_id: f64,
    #[serde(default)]
    pub opcoes: Value,
}

/// Menu item with normalized option groups, replaced wholesale on refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub base_price: f64,
    pub category: Category,
    pub option_groups: Vec<OptionGroup>,
}

impl MenuItem {
    /// Group at `index`, if any
    pub fn group(&self, index: usize) -> Option<&OptionGroup> {
        self.option_groups.get(index)
    }
}
