use super::category::Surface;
use super::codes::ErrorCode;
use http::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error every crate converts into before it reaches whoever presents it.
///
/// `details` carries structured context for the UI: the field that failed,
/// the limit, the remaining stock.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.as_ref()?.get(key)
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn surface(&self) -> Surface {
        self.code.surface()
    }

    pub fn is_transient(&self) -> bool {
        self.surface() == Surface::Transient
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::TabNotFound);
        assert_eq!(err.to_string(), "Tab not found");
        assert!(err.details.is_none());
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_details_accumulate() {
        let err = AppError::with_message(ErrorCode::PaymentAmountOutOfRange, "Amount above due")
            .with_detail("field", "amount")
            .with_detail("max", 87.5);

        assert_eq!(err.detail("field").unwrap(), "amount");
        assert_eq!(err.detail("max").unwrap(), 87.5);
        assert!(err.detail("min").is_none());
    }

    #[test]
    fn test_surface() {
        assert!(AppError::new(ErrorCode::NetworkError).is_transient());
        assert!(AppError::new(ErrorCode::TimeoutError).is_transient());
        assert!(!AppError::new(ErrorCode::ValidationFailed).is_transient());
        assert_eq!(
            AppError::new(ErrorCode::PaymentInvalidMethod).surface(),
            Surface::Blocking
        );
    }
}
