//! Stock check verdicts

use shared::client::StockCheckResponse;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum StockVerdict {
    /// Not enough units; `remaining` is what the backend has left
    Insufficient { remaining: f64 },
    /// Order may go ahead; warn when stock runs low
    Available {
        remaining_after: f64,
        restock_warning: bool,
    },
}

impl StockVerdict {
    /// Interpret the backend answer for `requested` units.
    ///
    /// The warning fires when the units left after this order are at or
    /// below `low_stock_threshold`.
    pub fn from_response(
        response: &StockCheckResponse,
        requested: u32,
        low_stock_threshold: f64,
    ) -> Self {
        if response.erro {
            return Self::Insufficient {
                remaining: response.quantidade,
            };
        }
        let remaining_after = response.quantidade - requested as f64;
        Self::Available {
            remaining_after,
            restock_warning: remaining_after <= low_stock_threshold,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Blocking error for an insufficient verdict
    pub fn into_result(self, item: &str) -> Result<Self, CoreError> {
        match self {
            Self::Insufficient { remaining } => Err(CoreError::InsufficientStock {
                item: item.to_string(),
                remaining,
            }),
            available => Ok(available),
        }
    }

    /// Operator notice, if any
    pub fn message(&self, item: &str) -> Option<String> {
        match self {
            Self::Insufficient { remaining } => Some(format!(
                "Not enough stock for {item}: only {remaining} left"
            )),
            Self::Available {
                remaining_after,
                restock_warning: true,
            } => Some(format!(
                "Only {remaining_after} of {item} left, restock recommended"
            )),
            Self::Available { .. } => None,
        }
    }
}
