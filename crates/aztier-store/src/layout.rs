//! File locations inside a catalogue repository.

use std::path::{Path, PathBuf};

use aztier_core::AssetCategory;

/// Name of the project configuration file at the repository root.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Name of the human-readable document in each category directory.
pub const DOCUMENT_FILE_NAME: &str = "README.md";

/// Resolves catalogue files relative to a repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueLayout {
    root: PathBuf,
}

impl CatalogueLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    #[must_use]
    pub fn category_dir(&self, category: AssetCategory) -> PathBuf {
        self.root.join(category.directory())
    }

    /// Path of the structured record (`tiered-*.json`).
    #[must_use]
    pub fn record_path(&self, category: AssetCategory) -> PathBuf {
        self.category_dir(category).join(category.record_file_name())
    }

    /// Path of the tier document.
    #[must_use]
    pub fn document_path(&self, category: AssetCategory) -> PathBuf {
        self.category_dir(category).join(DOCUMENT_FILE_NAME)
    }

    /// Path of the untiered addendum, for categories that have one.
    #[must_use]
    pub fn untiered_path(&self, category: AssetCategory) -> Option<PathBuf> {
        category
            .untiered_file_name()
            .map(|name| self.category_dir(category).join(name))
    }
}
