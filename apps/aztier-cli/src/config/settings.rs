//! Project settings read from `config.json` at the catalogue root.

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use super::{KEEP_LOCAL_CHANGES_VAR, UPSTREAM_BASE_URL_VAR};
use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    keep_local_changes: Option<Value>,
    upstream_base_url: Option<String>,
}

/// Settings for a synchronization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Keep field-level edits of local built-in entries instead of taking
    /// upstream values.
    pub keep_local_changes: bool,
    /// Location of the upstream catalogue, when not the default one.
    pub upstream_base_url: Option<String>,
}

impl Settings {
    /// Load settings from `path`, applying environment overrides.
    pub fn load(path: &Path) -> CliResult<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load settings with a custom environment lookup.
    pub fn load_with<F>(path: &Path, mut lookup: F) -> CliResult<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let keep_override = lookup(KEEP_LOCAL_CHANGES_VAR).filter(|v| !v.trim().is_empty());
        let upstream_override = lookup(UPSTREAM_BASE_URL_VAR).filter(|v| !v.trim().is_empty());

        let raw = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<RawSettings>(&content).map_err(|e| {
                CliError::Config(format!("{} is not valid: {e}", path.display()))
            })?,
            // The file is optional only when the environment supplies the flag.
            Err(e) if e.kind() == ErrorKind::NotFound && keep_override.is_some() => RawSettings {
                keep_local_changes: None,
                upstream_base_url: None,
            },
            Err(e) => {
                return Err(CliError::Config(format!(
                    "The config file {} could not be read: {e}",
                    path.display()
                )))
            }
        };

        let keep_local_changes = match (keep_override, raw.keep_local_changes) {
            (Some(value), _) => parse_flag(&Value::String(value))?,
            (None, Some(value)) => parse_flag(&value)?,
            (None, None) => {
                return Err(CliError::Config(format!(
                    "'keepLocalChanges' is missing from {}",
                    path.display()
                )))
            }
        };

        let settings = Self {
            keep_local_changes,
            upstream_base_url: upstream_override.or(raw.upstream_base_url),
        };
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }
}

/// Parse a `keepLocalChanges` value: `"true"` or `"false"` in any case, or a
/// JSON boolean.
pub fn parse_flag(value: &Value) -> CliResult<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid_flag(text)),
        },
        other => Err(invalid_flag(&other.to_string())),
    }
}

fn invalid_flag(value: &str) -> CliError {
    CliError::Config(format!(
        "Invalid 'keepLocalChanges' value '{value}'. Accepted values are: 'True', 'False'"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_flag_accepts_any_case_and_booleans() {
        assert!(parse_flag(&json!("True")).unwrap());
        assert!(!parse_flag(&json!("FALSE")).unwrap());
        assert!(parse_flag(&json!(true)).unwrap());
    }

    #[test]
    fn test_parse_flag_rejects_other_tokens() {
        assert!(matches!(parse_flag(&json!("yes")), Err(CliError::Config(_))));
        assert!(matches!(parse_flag(&json!(1)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"{"keepLocalChanges": "True", "upstreamBaseUrl": "https://mirror.test/aat/"}"#,
        );

        let settings = Settings::load_with(&path, no_env).unwrap();
        assert!(settings.keep_local_changes);
        assert_eq!(settings.upstream_base_url.as_deref(), Some("https://mirror.test/aat/"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"keepLocalChanges": "true"}"#);

        let settings = Settings::load_with(&path, |name| {
            (name == KEEP_LOCAL_CHANGES_VAR).then(|| "false".to_string())
        })
        .unwrap();
        assert!(!settings.keep_local_changes);
    }

    #[test]
    fn test_missing_file_needs_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        assert!(matches!(Settings::load_with(&path, no_env), Err(CliError::Config(_))));

        let settings = Settings::load_with(&path, |name| {
            (name == KEEP_LOCAL_CHANGES_VAR).then(|| "TRUE".to_string())
        })
        .unwrap();
        assert!(settings.keep_local_changes);
        assert_eq!(settings.upstream_base_url, None);
    }

    #[test]
    fn test_missing_flag_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"upstreamBaseUrl": "https://mirror.test/"}"#);

        let err = Settings::load_with(&path, no_env).unwrap_err();
        assert!(err.to_string().contains("keepLocalChanges"));
    }

    #[test]
    fn test_invalid_flag_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"keepLocalChanges": "maybe"}"#);

        let err = Settings::load_with(&path, no_env).unwrap_err();
        assert!(err.to_string().contains("'maybe'"));
    }
}
