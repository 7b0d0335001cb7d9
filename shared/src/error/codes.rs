//! Error codes shared by the backend contract and the client
//!
//! Ranges: 0xxx general, 4xxx tab and order, 5xxx payment, 6xxx menu and
//! stock, 9xxx system and transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Declares [`ErrorCode`] together with its messages, the `u16` table and
/// [`ErrorCode::ALL`], so the three can never disagree.
macro_rules! error_codes {
    ($( $(#[$meta:meta])* $name:ident = $value:literal => $message:literal, )+) => {
        /// Numeric error code; serialized as a bare `u16`
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(into = "u16", try_from = "u16")]
        #[repr(u16)]
        pub enum ErrorCode {
            $( $(#[$meta])* $name = $value, )+
        }

        impl ErrorCode {
            /// Every code, in table order
            pub const ALL: &'static [ErrorCode] = &[$( ErrorCode::$name, )+];

            /// Developer-facing English text
            pub const fn message(&self) -> &'static str {
                match self {
                    $( ErrorCode::$name => $message, )+
                }
            }
        }

        impl TryFrom<u16> for ErrorCode {
            type Error = InvalidErrorCode;

            fn try_from(value: u16) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(ErrorCode::$name), )+
                    _ => Err(InvalidErrorCode(value)),
                }
            }
        }
    };
}

error_codes! {
    // general
    Success = 0 => "Operation completed successfully",
    Unknown = 1 => "An unknown error occurred",
    ValidationFailed = 2 => "Validation failed",
    NotFound = 3 => "Resource not found",
    /// Malformed request sent to the backend
    InvalidRequest = 5 => "Invalid request",
    /// Text that should hold a number or a time did not
    InvalidFormat = 6 => "Invalid format",
    RequiredField = 7 => "Required field is missing",
    ValueOutOfRange = 8 => "Value is out of range",

    // tab and order
    TabNotFound = 4001 => "Tab not found",
    TabClosed = 4002 => "Tab has been closed",
    OrderItemNotFound = 4006 => "Order line not found",
    /// Draft with no line left to send
    OrderEmpty = 4007 => "Order has no lines to send",
    InvalidQuantity = 4008 => "Invalid quantity",

    // payment
    PaymentFailed = 5001 => "Payment failed",
    PaymentInvalidMethod = 5003 => "Select a payment method",
    PaymentAmountOutOfRange = 5006 => "Payment amount is out of range",
    /// Itemized payment with every quantity at zero
    PaymentNothingSelected = 5007 => "Select at least one item to pay",
    PaymentNothingDue = 5008 => "Nothing left to pay on this tab",
    PaymentNotFound = 5009 => "Payment not found",

    // menu and stock
    ProductNotFound = 6001 => "Product not found",
    /// Stock check came back short
    ProductOutOfStock = 6003 => "Product is out of stock",
    OptionSoldOut = 6305 => "Option is sold out",

    // system and transport
    InternalError = 9001 => "Internal error",
    NetworkError = 9003 => "Network error",
    TimeoutError = 9004 => "Request timed out",
    ConfigError = 9005 => "Configuration error",
    /// The message channel to the backend is gone
    ClientDisconnected = 9201 => "Message channel disconnected",
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A `u16` that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trips() {
        assert_eq!(ErrorCode::ALL.len(), 27);
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_unknown_numbers_are_rejected() {
        for value in [4, 999, 1001, 10000] {
            assert_eq!(ErrorCode::try_from(value), Err(InvalidErrorCode(value)));
        }
    }

    #[test]
    fn test_wire_form_is_the_number() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::PaymentInvalidMethod).unwrap(),
            "5003"
        );
        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::TabNotFound);
        assert!(serde_json::from_str::<ErrorCode>("1234").is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(ErrorCode::TimeoutError.to_string(), "9004");
        assert_eq!(
            ErrorCode::PaymentNothingSelected.message(),
            "Select at least one item to pay"
        );
        assert_eq!(InvalidErrorCode(77).to_string(), "invalid error code: 77");
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
    }
}
