// error.rs — Error types for loading challenge records and catalogs.

use thiserror::Error;

/// Errors that can occur while reading challenge data from disk or JSON.
///
/// Editing itself never fails: applicators are total and validation
/// answers with a boolean. These errors only come from the edges.
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize challenge data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
