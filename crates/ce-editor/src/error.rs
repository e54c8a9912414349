// error.rs — Error types for the editor controller.

use ce_api::ApiError;
use thiserror::Error;

/// Errors that can occur while editing or persisting a challenge.
///
/// Network failures during auto-save never reach this type; they are
/// reported as `SaveOutcome::Recovered` instead.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A resource role is missing from the metadata catalog.
    #[error("resource role not found in catalog: {0}")]
    RoleNotFound(String),

    /// Invalid launch workflow transition.
    #[error("invalid launch transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The editor config could not be read or parsed.
    #[error("config error at {path}: {message}")]
    Config { path: String, message: String },

    /// A collaborator call failed where the failure is not recoverable.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize event data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
