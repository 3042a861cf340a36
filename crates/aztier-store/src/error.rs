//! Error types for the persistence layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `StoreError`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while reading or writing persisted catalogue files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A structured record could not be decoded into assets.
    #[error("Malformed tiered record '{path}': {reason}")]
    MalformedRecord { path: PathBuf, reason: String },

    /// A Markdown document does not have the expected sections or tables.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL error while building document links.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Asset validation error.
    #[error(transparent)]
    Asset(#[from] aztier_core::CoreError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
