//! Error types for the tiering core.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while validating, diffing or reconciling assets.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A diff operation was called with arguments violating its contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A record has no string `id` field.
    #[error("Asset record is missing a valid 'id' field: {0}")]
    MissingAssetId(String),

    /// A record is not a JSON object.
    #[error("Asset record must be a JSON object, got: {0}")]
    NotAnObject(String),

    /// An unknown `assetType` value.
    #[error("Invalid asset type '{0}'. Accepted values are: Built-in, Custom")]
    InvalidAssetType(String),

    /// An asset expected to be present during a merge was not found.
    ///
    /// This is an internal invariant violation: the lookup sets are derived
    /// from the same collections being merged.
    #[error("Asset '{0}' disappeared during merge")]
    MissingAsset(String),
}
