//! In-memory view of the tiered records for one command run.
//!
//! Records are read once when the state is loaded and written once by
//! [`TierState::persist`]. A command that fails before persisting leaves
//! every file untouched.

use std::collections::HashMap;
use tracing::{debug, info};

use aztier_core::{Asset, AssetCategory};
use aztier_store::{load_record, save_record, CatalogueLayout};

use crate::error::CliResult;

#[derive(Debug, Default)]
struct CategoryRecord {
    assets: Vec<Asset>,
    dirty: bool,
}

/// Tiered records keyed by category.
#[derive(Debug)]
pub struct TierState {
    layout: CatalogueLayout,
    records: HashMap<AssetCategory, CategoryRecord>,
}

impl TierState {
    /// State with nothing loaded, for commands that produce records from
    /// scratch.
    pub fn empty(layout: CatalogueLayout) -> Self {
        Self {
            layout,
            records: HashMap::new(),
        }
    }

    /// Load the records of `categories`.
    pub fn load(layout: CatalogueLayout, categories: &[AssetCategory]) -> CliResult<Self> {
        let mut records = HashMap::with_capacity(categories.len());
        for &category in categories {
            let assets = load_record(&layout.record_path(category))?;
            debug!(%category, count = assets.len(), "Loaded tiered record");
            records.insert(
                category,
                CategoryRecord {
                    assets,
                    dirty: false,
                },
            );
        }
        Ok(Self { layout, records })
    }

    pub fn layout(&self) -> &CatalogueLayout {
        &self.layout
    }

    /// Current assets of a category; empty if it was never loaded.
    pub fn records(&self, category: AssetCategory) -> &[Asset] {
        self.records
            .get(&category)
            .map(|record| record.assets.as_slice())
            .unwrap_or_default()
    }

    /// Replace the assets of a category and mark it for writing.
    pub fn update(&mut self, category: AssetCategory, assets: Vec<Asset>) {
        let record = self.records.entry(category).or_default();
        record.assets = assets;
        record.dirty = true;
    }

    /// Whether a category has changes waiting to be written.
    pub fn is_dirty(&self, category: AssetCategory) -> bool {
        self.records.get(&category).is_some_and(|record| record.dirty)
    }

    /// Write every changed record. Returns the number of files written.
    pub fn persist(&mut self) -> CliResult<usize> {
        let mut written = 0;
        for category in AssetCategory::ALL {
            let Some(record) = self.records.get_mut(&category) else {
                continue;
            };
            if !record.dirty {
                continue;
            }
            save_record(&self.layout.record_path(category), &record.assets)?;
            record.dirty = false;
            written += 1;
            info!(%category, count = record.assets.len(), "Tiered record written");
        }
        Ok(written)
    }
}
