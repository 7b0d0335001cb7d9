//! Client error types

use comanda_core::CoreError;
use shared::error::{AppError, ErrorCode, Surface};
use thiserror::Error;

use crate::message::MessageError;

/// Error body returned by the backend on a failed REST call
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a structured error
    #[error("API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error reported by the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Message channel failure
    #[error(transparent)]
    Message(#[from] MessageError),

    /// Business rule refused the operation locally
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn from_api(body: ApiErrorResponse) -> Self {
        Self::Api {
            code: body.code,
            message: body.message,
            details: body.details,
        }
    }

    /// Error code this failure is reported under
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorCode::TimeoutError,
            Self::Http(_) => ErrorCode::NetworkError,
            Self::Api { code, .. } => ErrorCode::try_from(*code).unwrap_or(ErrorCode::Unknown),
            Self::InvalidResponse(_) => ErrorCode::InvalidFormat,
            Self::Unauthorized => ErrorCode::InvalidRequest,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Message(MessageError::Timeout(_)) => ErrorCode::TimeoutError,
            Self::Message(_) => ErrorCode::ClientDisconnected,
            Self::Core(e) => e.code(),
            Self::Serialization(_) => ErrorCode::InvalidFormat,
        }
    }

    /// How the operator should see this error.
    ///
    /// Transport failures are transient whatever their code; the operator
    /// retries by hand.
    pub fn surface(&self) -> Surface {
        match self {
            Self::Http(_) | Self::Message(_) | Self::Internal(_) => Surface::Transient,
            _ => self.code().surface(),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Core(core) => core.into(),
            other => AppError::with_message(other.code(), other.to_string()),
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
