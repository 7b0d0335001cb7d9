use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorCode};

/// Handshake payload (client -> backend)
///
/// Carries the protocol version so the backend can reject stale clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakePayload {
    pub version: u16,
    pub client_name: Option<String>,
    pub client_version: Option<String>,
    /// Unique per client instance
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Generic response payload (backend -> client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl ResponsePayload {
    pub fn success(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error_code: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            success: false,
            message: err.message.clone(),
            data: None,
            error_code: Some(err.code),
        }
    }

    /// Convert a failed response into an [`AppError`]
    pub fn into_result(self) -> Result<Option<serde_json::Value>, AppError> {
        if self.success {
            return Ok(self.data);
        }
        Err(AppError::with_message(
            self.error_code.unwrap_or(ErrorCode::Unknown),
            self.message,
        ))
    }
}
