use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Business rule violations
///
/// Every variant is a validation failure: the operation that produced it
/// was aborted and no state was changed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Quantity {requested} exceeds the {remaining} unpaid units of the line")]
    QuantityAboveRemaining { requested: u32, remaining: u32 },

    #[error("Order line not found: {0}")]
    LineNotFound(String),

    #[error("Select a payment method")]
    MethodRequired,

    #[error("Select at least one unit to pay")]
    NothingSelected,

    #[error("Amount {amount:.2} must be greater than 0 and at most {max:.2}")]
    AmountOutOfRange { amount: f64, max: f64 },

    #[error("Nothing left to pay")]
    NothingDue,

    #[error("Invalid payment flow transition: {0}")]
    InvalidTransition(String),

    #[error("No lines to send")]
    EmptyOrder,

    #[error("Tab is required")]
    TabRequired,

    #[error("Not enough stock for {item}: {remaining} left")]
    InsufficientStock { item: String, remaining: f64 },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CoreError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::QuantityAboveRemaining { .. } => ErrorCode::InvalidQuantity,
            Self::LineNotFound(_) => ErrorCode::OrderItemNotFound,
            Self::MethodRequired => ErrorCode::PaymentInvalidMethod,
            Self::NothingSelected => ErrorCode::PaymentNothingSelected,
            Self::AmountOutOfRange { .. } => ErrorCode::PaymentAmountOutOfRange,
            Self::NothingDue => ErrorCode::PaymentNothingDue,
            Self::InvalidTransition(_) => ErrorCode::InvalidRequest,
            Self::EmptyOrder => ErrorCode::OrderEmpty,
            Self::TabRequired => ErrorCode::RequiredField,
            Self::InsufficientStock { .. } => ErrorCode::ProductOutOfStock,
            Self::InvalidField { .. } => ErrorCode::ValidationFailed,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let app = AppError::with_message(err.code(), message);
        match err {
            CoreError::QuantityAboveRemaining {
                requested,
                remaining,
            } => app
                .with_detail("requested", requested)
                .with_detail("remaining", remaining),
            CoreError::AmountOutOfRange { amount, max } => {
                app.with_detail("amount", amount).with_detail("max", max)
            }
            CoreError::InsufficientStock { item, remaining } => app
                .with_detail("item", item)
                .with_detail("remaining", remaining),
            CoreError::InvalidField { field, .. } => app.with_detail("field", field),
            CoreError::LineNotFound(key) => app.with_detail("line", key),
            _ => app,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
