//! Configuration management for the aztier CLI

mod settings;

pub use settings::{parse_flag, Settings};

/// Environment variable overriding `keepLocalChanges` from `config.json`.
pub const KEEP_LOCAL_CHANGES_VAR: &str = "AZTIER_KEEP_LOCAL_CHANGES";

/// Environment variable overriding `upstreamBaseUrl` from `config.json`.
pub const UPSTREAM_BASE_URL_VAR: &str = "AZTIER_UPSTREAM_BASE_URL";

/// Environment variable overriding the base that document links point to.
pub const DOCUMENT_BASE_URL_VAR: &str = "AZTIER_DOCUMENT_BASE_URL";
