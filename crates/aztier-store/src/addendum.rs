//! The untiered addendum: a dated Markdown table of assets found in use in a
//! tenant that the catalogue does not tier yet.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use aztier_core::{AssetCategory, UntieredEntry};

use crate::document::{is_section_heading, SEPARATOR_ROW};
use crate::{StoreError, StoreResult};

/// An untiered addendum split around the rows of its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntieredAddendum {
    /// Everything up to and including the table separator.
    head: Vec<String>,
    rows: Vec<String>,
    /// Everything after the last table row.
    tail: Vec<String>,
}

impl UntieredAddendum {
    /// Splits addendum content around its table rows.
    ///
    /// # Errors
    ///
    /// Returns `MalformedDocument` if the first section has no table.
    pub fn parse(content: &str) -> StoreResult<Self> {
        let lines: Vec<&str> = content.split('\n').collect();

        // Entries live in the first `##` section; tables above it (legends,
        // notes) are part of the preamble.
        let section_start = lines
            .iter()
            .position(|line| is_section_heading(line))
            .ok_or_else(|| {
                StoreError::MalformedDocument("untiered addendum has no section".to_string())
            })?;
        let section_end = lines[section_start + 1..]
            .iter()
            .position(|line| is_section_heading(line))
            .map_or(lines.len(), |offset| section_start + 1 + offset);

        let separator = (section_start + 1..section_end)
            .rev()
            .find(|&i| SEPARATOR_ROW.is_match(lines[i]))
            .ok_or_else(|| {
                StoreError::MalformedDocument("untiered addendum has no table".to_string())
            })?;

        let first_row = separator + 1;
        let end = lines[first_row..]
            .iter()
            .position(|line| !line.trim_start().starts_with('|'))
            .map_or(lines.len(), |offset| first_row + offset);

        let owned = |slice: &[&str]| slice.iter().map(|l| (*l).to_string()).collect::<Vec<_>>();
        Ok(Self {
            head: owned(&lines[..first_row]),
            rows: owned(&lines[first_row..end]),
            tail: owned(&lines[end..]),
        })
    }

    /// An empty addendum for a category.
    #[must_use]
    pub fn default_for(category: AssetCategory) -> Self {
        let subject = match category {
            AssetCategory::EntraRole => "custom Entra roles",
            _ => "Azure roles",
        };
        let head = vec![
            format!("# Untiered {subject}"),
            String::new(),
            format!(
                "{} observed in the tenant that have not been tiered yet, newest first.",
                capitalize(subject)
            ),
            String::new(),
            format!("## Untiered {subject}"),
            String::new(),
            "| Date | Name | Type | Description |".to_string(),
            "|---|---|---|---|".to_string(),
        ];
        Self {
            head,
            rows: Vec::new(),
            tail: vec![String::new()],
        }
    }

    /// Loads an addendum; a missing file starts from the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has no table.
    pub fn load(path: &Path, category: AssetCategory) -> StoreResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Addendum not found, starting from default");
                Ok(Self::default_for(category))
            }
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds entries above the existing ones, skipping any already recorded
    /// under the same link or name. Returns whether anything was added.
    pub fn append(&mut self, entries: &[UntieredEntry]) -> bool {
        let mut fresh: Vec<String> = Vec::new();

        for entry in entries {
            let asset = &entry.asset;
            let name_cell = format!("[{}]", sanitize(&asset.name));
            let link_cell = format!("({})", asset.link);
            let recorded = self
                .rows
                .iter()
                .chain(fresh.iter())
                .any(|row| row.contains(&link_cell) || row.contains(&name_cell));
            if recorded {
                debug!(name = %asset.name, "Untiered asset already recorded");
                continue;
            }

            fresh.push(format!(
                "| {} | {}{} | {} | {} |",
                entry.date_label(),
                name_cell,
                link_cell,
                asset.asset_type,
                sanitize(&asset.description)
            ));
        }

        if fresh.is_empty() {
            return false;
        }
        info!(added = fresh.len(), "Recorded untiered assets");
        fresh.append(&mut self.rows);
        self.rows = fresh;
        true
    }

    #[must_use]
    pub fn render(&self) -> String {
        self.head
            .iter()
            .chain(&self.rows)
            .chain(&self.tail)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Writes the addendum, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::write(path, self.render()).map_err(|e| StoreError::io(path, e))
    }
}

fn sanitize(text: &str) -> String {
    text.replace(['\r', '\n'], " ").replace('|', "\\|")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
