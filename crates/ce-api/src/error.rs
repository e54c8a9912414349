// error.rs — Error types for the challenge API collaborators.

use thiserror::Error;

/// Errors returned by a [`ChallengeApi`](crate::ChallengeApi) call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("timeout: {0}")]
    Timeout(String),

    /// The backend rejected the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The addressed challenge or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Map a non-success status and body to an error.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized(body.to_string()),
            404 => ApiError::NotFound(body.to_string()),
            408 | 504 => ApiError::Timeout(body.to_string()),
            _ => ApiError::Http {
                status,
                message: body.to_string(),
            },
        }
    }

    /// Whether repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short category name for logs and events.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Timeout(_) => "timeout",
            ApiError::Unauthorized(_) => "auth",
            ApiError::NotFound(_) => "not_found",
            ApiError::Http { .. } => "http",
            ApiError::Deserialization(_) => "deserialization",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Timeout(error.to_string())
        } else if error.is_decode() {
            ApiError::Deserialization(error.to_string())
        } else if let Some(status) = error.status() {
            ApiError::from_status(status.as_u16(), &error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
