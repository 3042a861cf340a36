//! The tier document: a Markdown page with a `##` definitions section
//! followed by one `##` section per tier.
//!
//! Each tier section holds a table. The tools own the data rows of that
//! table and nothing else: headings, prose, anchors, table headers and
//! separators are left exactly as written.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

use aztier_core::{
    normalize_name, Asset, AssetCategory, FIELD_ASSET_NAME, FIELD_ASSET_TYPE, FIELD_ID, FIELD_TIER,
};

use crate::{StoreError, StoreResult};

/// Default root of the published documents that built-in names link to.
pub const DEFAULT_DOCUMENT_BASE: &str = "https://github.com/emiliensocchi/azure-tiering/tree/main/";

/// Decoration removed from cells when reading a document: link brackets and
/// targets, emphasis, line breaks, code ticks, and the warning and clock marks.
static DECORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[|\]|\(https?://[^\s)]+\)|\(#[a-z0-9\-]*\)|\x{26A0}\x{FE0F}? ?|\*|<br>|`|\x{1F570}\x{FE0F}? ?",
    )
    .expect("DECORATION is a valid regex pattern")
});

pub(crate) static SEPARATOR_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|(\s*:?-+:?\s*\|)+\s*$").expect("SEPARATOR_ROW is a valid regex pattern")
});

/// Descriptive columns that follow the name and type columns of a tier table.
#[must_use]
pub fn tier_columns(category: AssetCategory, tier: u8) -> &'static [&'static str] {
    match (category, tier) {
        (AssetCategory::AzureRole, 0 | 1) => &["shortestPath", "example"],
        (AssetCategory::AzureRole, _) => &["worstCaseScenario"],
        (AssetCategory::EntraRole | AssetCategory::MsGraphAppPermission, 0) => {
            &["pathType", "shortestPath", "example"]
        }
        (AssetCategory::EntraRole, 1) => &["providesFullAccessTo"],
        _ => &[],
    }
}

/// Returns the page that built-in names of a category link to.
///
/// # Errors
///
/// Returns an error if `base` is not a valid base URL.
pub fn document_link_base(base: &str, category: AssetCategory) -> StoreResult<String> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| StoreError::MalformedDocument(format!("'{base}' cannot hold a path")))?
        .pop_if_empty()
        .push(category.directory());
    Ok(url.to_string())
}

/// Location of one tier table inside the document's lines.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TierTable {
    tier: u8,
    /// Index of the first data row (the line after the separator).
    first_row: usize,
    /// Index one past the last data row.
    end: usize,
}

pub(crate) fn is_section_heading(line: &str) -> bool {
    line.starts_with("##") && !line.starts_with("###")
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn locate_tier_tables(lines: &[&str], category: AssetCategory) -> StoreResult<Vec<TierTable>> {
    let headings: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| is_section_heading(line))
        .map(|(index, _)| index)
        .collect();

    // The first section holds the tier definitions; tier sections follow it
    // in order and any later section is left alone.
    let tier_count = usize::from(category.tier_count());
    if headings.len() <= tier_count {
        return Err(StoreError::MalformedDocument(format!(
            "{category} document has {} sections, expected a definitions section and {tier_count} tier sections",
            headings.len()
        )));
    }

    let mut tables = Vec::with_capacity(tier_count);

    for position in 0..tier_count {
        let start = headings[position + 1];
        let section_end = headings
            .get(position + 2)
            .copied()
            .unwrap_or(lines.len());
        // Positions are bounded by tier_count, which fits in u8.
        let tier = u8::try_from(position).unwrap_or(u8::MAX);

        let separator = (start + 2..section_end)
            .find(|&i| is_table_row(lines[i - 1]) && SEPARATOR_ROW.is_match(lines[i]))
            .ok_or_else(|| {
                StoreError::MalformedDocument(format!(
                    "{category} tier {tier} section has no table"
                ))
            })?;

        let first_row = separator + 1;
        let end = (first_row..section_end)
            .find(|&i| !is_table_row(lines[i]))
            .unwrap_or(section_end);

        tables.push(TierTable {
            tier,
            first_row,
            end,
        });
    }

    Ok(tables)
}

/// Rewrites the data rows of every tier table from `assets`.
///
/// Assets are written in the order given. Built-in names link to
/// `<link_base>#<name-lowercase-hyphenated>`; custom names are plain.
///
/// # Errors
///
/// Returns `MalformedDocument` if a tier section or its table is missing.
pub fn render_document(
    existing: &str,
    category: AssetCategory,
    assets: &[Asset],
    link_base: &str,
) -> StoreResult<String> {
    let lines: Vec<&str> = existing.split('\n').collect();
    let tables = locate_tier_tables(&lines, category)?;

    let mut rendered: Vec<String> = Vec::with_capacity(lines.len() + assets.len());
    let mut cursor = 0;
    let mut written = 0;

    for table in &tables {
        rendered.extend(lines[cursor..table.first_row].iter().map(|l| (*l).to_string()));

        let label = table.tier.to_string();
        let columns = tier_columns(category, table.tier);
        for asset in assets.iter().filter(|a| a.tier_label() == label) {
            rendered.push(render_row(asset, columns, link_base));
            written += 1;
        }
        cursor = table.end;
    }
    rendered.extend(lines[cursor..].iter().map(|l| (*l).to_string()));

    if written < assets.len() {
        warn!(
            %category,
            skipped = assets.len() - written,
            "Some assets have a tier without a section and were not written"
        );
    }
    debug!(%category, rows = written, "Rendered tier document");

    Ok(rendered.join("\n"))
}

fn render_row(asset: &Asset, columns: &[&str], link_base: &str) -> String {
    let name = asset.asset_name();
    let name_cell = if asset.is_built_in() {
        let anchor = name.to_lowercase().replace(' ', "-");
        format!("[{name}]({link_base}#{anchor})")
    } else {
        name.to_string()
    };

    let mut cells = vec![name_cell, cell_text(asset.get(FIELD_ASSET_TYPE))];
    cells.extend(columns.iter().map(|column| cell_text(asset.get(column))));
    format!("| {} |", cells.join(" | "))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Reads every tier table back into assets.
///
/// Ids are looked up in `ids` by normalized name; unknown names get an empty
/// id. `shortestPath` is reduced to ASCII.
///
/// # Errors
///
/// Returns `MalformedDocument` if a tier section or its table is missing.
pub fn parse_document(
    content: &str,
    category: AssetCategory,
    ids: &HashMap<String, String>,
) -> StoreResult<Vec<Asset>> {
    let lines: Vec<&str> = content.split('\n').collect();
    let tables = locate_tier_tables(&lines, category)?;
    let mut assets = Vec::new();

    for table in tables {
        let columns = tier_columns(category, table.tier);
        for line in &lines[table.first_row..table.end] {
            let cells = split_row(line);
            let name = strip(cells.first().map_or("", String::as_str));
            let id = match ids.get(&normalize_name(&name)) {
                Some(id) => id.clone(),
                None => {
                    warn!(%category, name = %name, "No definition id found for asset");
                    String::new()
                }
            };

            let mut fields = Map::new();
            fields.insert(FIELD_TIER.to_string(), Value::String(table.tier.to_string()));
            fields.insert(FIELD_ID.to_string(), Value::String(id));
            fields.insert(
                FIELD_ASSET_TYPE.to_string(),
                Value::String(strip(cells.get(1).map_or("", String::as_str))),
            );
            fields.insert(FIELD_ASSET_NAME.to_string(), Value::String(name));

            for (offset, column) in columns.iter().enumerate() {
                let raw = strip(cells.get(offset + 2).map_or("", String::as_str));
                let value = if *column == "shortestPath" {
                    raw.chars().filter(char::is_ascii).collect::<String>().trim().to_string()
                } else {
                    raw
                };
                fields.insert((*column).to_string(), Value::String(value));
            }

            assets.push(Asset::try_from(fields)?);
        }
    }

    debug!(%category, count = assets.len(), "Parsed tier document");
    Ok(assets)
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn strip(cell: &str) -> String {
    DECORATION.replace_all(cell, "").trim().to_string()
}

/// Reads a document from disk.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read.
pub fn load_document(path: &Path) -> StoreResult<String> {
    fs::read_to_string(path).map_err(|e| StoreError::io(path, e))
}

/// Writes a document, replacing the file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn save_document(path: &Path, content: &str) -> StoreResult<()> {
    fs::write(path, content).map_err(|e| StoreError::io(path, e))
}
