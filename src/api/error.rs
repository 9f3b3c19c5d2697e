use serde::Deserialize;
use thiserror::Error;

pub const GENERIC_MESSAGE: &str = "An error occurred";
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please check your connection.";

/// Failure of a call against the REST API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The request went out but nothing came back
    #[error("{}", NO_RESPONSE_MESSAGE)]
    NoResponse,

    #[error("{0}")]
    Unexpected(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shape used by the backend
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Build a `Status` error from a raw response body. Bodies that are not
    /// JSON still produce the generic message.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_MESSAGE.to_string());

        ApiError::Status {
            status,
            message,
            details: parsed.details,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Text to show the user, or `fallback` when the error carries none.
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            ApiError::NoResponse
        } else {
            ApiError::Unexpected(err.to_string())
        }
    }
}
