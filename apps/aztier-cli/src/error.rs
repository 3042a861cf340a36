//! CLI error types and exit codes

use thiserror::Error;

use aztier_connector_azure::AzureError;
use aztier_core::CoreError;
use aztier_store::StoreError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Authentication required
/// - 3: Network error
/// - 4: Invalid catalogue data
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing access token: {0} is not set or empty")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Malformed catalogue file: {0}")]
    MalformedState(String),

    #[error("Invalid catalogue data: {0}")]
    Catalogue(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::MissingCredential(_) => 2,
            CliError::Network(_) => 3,
            CliError::MalformedState(_) | CliError::Catalogue(_) => 4,
            CliError::InvalidResponse(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else if *status == 401 || *status == 403 {
                    2
                } else {
                    4
                }
            }
            CliError::Config(_) | CliError::Io(_) => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::MissingCredential(_) => Some(
                "Export ARM_ACCESS_TOKEN and MSGRAPH_ACCESS_TOKEN, or put them in a .env file.",
            ),
            CliError::Api { status: 401, .. } => {
                Some("The access token was rejected. Request a fresh token and try again.")
            }
            CliError::Api { status: 403, .. } => {
                Some("The identity behind the token lacks read access to role definitions.")
            }
            CliError::MalformedState(_) => {
                Some("Fix or remove the file named above; nothing was written.")
            }
            _ => None,
        }
    }
}

impl From<AzureError> for CliError {
    fn from(e: AzureError) -> Self {
        match e {
            AzureError::Config(msg) => CliError::Config(msg),
            AzureError::Url(e) => CliError::Config(format!("Invalid URL: {e}")),
            AzureError::MissingCredential(var) => CliError::MissingCredential(var),
            AzureError::Api {
                status,
                code,
                message,
            } => CliError::Api {
                status,
                message: format!("{code} - {message}"),
            },
            AzureError::Http(e) if e.is_timeout() => {
                CliError::Network("Request timed out".to_string())
            }
            AzureError::Http(e) => CliError::Network(e.to_string()),
            AzureError::Asset(e) => CliError::Catalogue(format!("upstream record: {e}")),
            e @ (AzureError::BatchRequest { .. }
            | AzureError::InvalidResponse(_)
            | AzureError::Json(_)) => CliError::InvalidResponse(e.to_string()),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Io { .. } | StoreError::Json(_) => CliError::Io(e.to_string()),
            StoreError::Url(e) => CliError::Config(format!("Invalid URL: {e}")),
            StoreError::MalformedRecord { .. }
            | StoreError::MalformedDocument(_)
            | StoreError::Asset(_) => CliError::MalformedState(e.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Catalogue(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}
