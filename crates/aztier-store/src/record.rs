//! The structured record: a pretty-printed JSON array of assets.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use aztier_core::Asset;

use crate::{StoreError, StoreResult};

const INDENT: &[u8] = b"    ";

/// Reads a record. A missing or blank file reads as an empty collection.
///
/// # Errors
///
/// Returns `MalformedRecord` if the content is not a JSON array of assets
/// with string ids.
pub fn load_record(path: &Path) -> StoreResult<Vec<Asset>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "Record not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };
    parse_record(&content).map_err(|reason| StoreError::MalformedRecord {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parses record content. Blank content is an empty collection.
pub fn parse_record(content: &str) -> Result<Vec<Asset>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    Asset::collection_from_value(value).map_err(|e| e.to_string())
}

/// Renders a record with four-space indentation.
pub fn render_record(assets: &[Asset]) -> StoreResult<String> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    assets.serialize(&mut serializer)?;
    String::from_utf8(buffer)
        .map_err(|e| StoreError::MalformedDocument(format!("record is not valid UTF-8: {e}")))
}

/// Writes a record, replacing the file.
pub fn save_record(path: &Path, assets: &[Asset]) -> StoreResult<()> {
    let content = render_record(assets)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| StoreError::io(path, e))?;
    debug!(path = %path.display(), count = assets.len(), "Record written");
    Ok(())
}
