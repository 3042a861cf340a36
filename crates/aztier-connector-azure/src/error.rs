//! Error types for the Azure connector.

use thiserror::Error;

/// Result type alias using `AzureError`.
pub type AzureResult<T> = Result<T, AzureError>;

/// Errors that can occur when talking to ARM, Microsoft Graph or the
/// upstream catalogue.
#[derive(Debug, Error)]
pub enum AzureError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required access token is absent or empty.
    #[error("A valid access token is required in the '{0}' environment variable")]
    MissingCredential(&'static str),

    /// The remote API answered with a non-success status.
    #[error("API error ({status}): {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A sub-request of an ARM batch failed.
    #[error("Batch sub-request '{name}' failed with status {status}")]
    BatchRequest { name: String, status: u16 },

    /// The response did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The upstream catalogue returned a record that is not a valid asset.
    #[error("Invalid upstream asset: {0}")]
    Asset(#[from] aztier_core::CoreError),
}
