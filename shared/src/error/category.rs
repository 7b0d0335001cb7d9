use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain of an error, taken from the thousands digit of its code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    /// Tabs and order lines
    Order,
    Payment,
    /// Menu items, options and stock
    Product,
    /// Transport, configuration and anything outside the known ranges
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code / 1000 {
            0 => Self::General,
            4 => Self::Order,
            5 => Self::Payment,
            6 => Self::Product,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Product => "product",
            Self::System => "system",
        }
    }
}

/// How an error is presented to the operator.
///
/// Blocking errors abort the operation that raised them and leave state
/// untouched. Transient ones are a dismissable notice; the operator retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Blocking,
    Transient,
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    pub fn surface(&self) -> Surface {
        match self {
            Self::NetworkError
            | Self::TimeoutError
            | Self::ClientDisconnected
            | Self::PaymentFailed
            | Self::OptionSoldOut => Surface::Transient,
            _ => Surface::Blocking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_by_range() {
        let cases = [
            (0, ErrorCategory::General),
            (999, ErrorCategory::General),
            (2500, ErrorCategory::System),
            (4001, ErrorCategory::Order),
            (5009, ErrorCategory::Payment),
            (6305, ErrorCategory::Product),
            (9201, ErrorCategory::System),
        ];
        for (code, category) in cases {
            assert_eq!(ErrorCategory::from_code(code), category, "code {code}");
        }
        assert_eq!(ErrorCode::OptionSoldOut.category(), ErrorCategory::Product);
        assert_eq!(ErrorCategory::Order.name(), "order");
    }

    #[test]
    fn test_only_connectivity_and_notices_are_transient() {
        let transient: Vec<_> = ErrorCode::ALL
            .iter()
            .filter(|code| code.surface() == Surface::Transient)
            .copied()
            .collect();
        assert_eq!(
            transient,
            [
                ErrorCode::PaymentFailed,
                ErrorCode::OptionSoldOut,
                ErrorCode::NetworkError,
                ErrorCode::TimeoutError,
                ErrorCode::ClientDisconnected,
            ]
        );
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Payment).unwrap(),
            "\"payment\""
        );
        let surface: Surface = serde_json::from_str("\"transient\"").unwrap();
        assert_eq!(surface, Surface::Transient);
    }
}
