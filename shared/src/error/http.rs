//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code the backend uses for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::TabNotFound
            | Self::OrderItemNotFound
            | Self::PaymentNotFound
            | Self::ProductNotFound => StatusCode::NOT_FOUND,

            Self::TabClosed => StatusCode::CONFLICT,

            Self::ProductOutOfStock | Self::OptionSoldOut => StatusCode::UNPROCESSABLE_ENTITY,

            // Transient errors, the operator can retry
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            Self::InternalError | Self::ConfigError | Self::ClientDisconnected => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::TabNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::PaymentNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_validation_defaults_to_bad_request() {
        assert_eq!(
            ErrorCode::PaymentAmountOutOfRange.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_transient_statuses() {
        assert_eq!(
            ErrorCode::TimeoutError.http_status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
