//! Detection of assets in use in a live tenant that have no tier yet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::diff::{added_unchecked, removed_unchecked};
use crate::{Asset, AssetCategory, AssetType, Identified};

/// A role definition observed in the live tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedAsset {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// URI of the definition in the platform API.
    pub link: String,
}

impl Identified for ObservedAsset {
    fn id(&self) -> &str {
        &self.id
    }
}

/// An observed asset along with the day it was first reported as untiered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntieredEntry {
    pub date: NaiveDate,
    pub asset: ObservedAsset,
}

impl UntieredEntry {
    /// Returns the date in `YYYY-MM-DD` form.
    #[must_use]
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Which tiered entries a tenant snapshot is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorScope {
    /// Every tiered entry, built-in and custom.
    All,
    /// Only custom entries; the snapshot lists custom definitions only.
    CustomOnly,
}

impl DetectorScope {
    /// Returns the scope used for a category, or `None` if the category has
    /// no untiered detection.
    #[must_use]
    pub fn for_category(category: AssetCategory) -> Option<Self> {
        match category {
            AssetCategory::AzureRole => Some(DetectorScope::All),
            AssetCategory::EntraRole => Some(DetectorScope::CustomOnly),
            AssetCategory::MsGraphAppPermission => None,
        }
    }

    fn includes(&self, asset: &Asset) -> bool {
        match self {
            DetectorScope::All => true,
            DetectorScope::CustomOnly => asset.is_custom(),
        }
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct UntieredReport {
    /// Observed assets with no tiered entry, sorted by name.
    pub new_entries: Vec<UntieredEntry>,
    /// Custom tiered entries the tenant no longer reports.
    pub purged: Vec<Asset>,
    /// The tiered collection with `purged` removed.
    pub tiered: Vec<Asset>,
}

impl UntieredReport {
    /// Returns true if the tiered collection lost entries.
    #[must_use]
    pub fn has_purged(&self) -> bool {
        !self.purged.is_empty()
    }
}

/// Compares a tenant snapshot with the tiered collection.
///
/// Built-in entries the tenant does not report are kept: the snapshot only
/// covers roles in use.
#[must_use]
pub fn detect_untiered(
    snapshot: &[ObservedAsset],
    tiered: Vec<Asset>,
    scope: DetectorScope,
    date: NaiveDate,
) -> UntieredReport {
    let scoped: Vec<Asset> = tiered.iter().filter(|a| scope.includes(a)).cloned().collect();

    let mut added = added_unchecked(snapshot, &scoped);
    added.sort_by(|a, b| a.name.cmp(&b.name));
    let new_entries: Vec<UntieredEntry> = added
        .into_iter()
        .map(|asset| UntieredEntry { date, asset })
        .collect();

    let purged: Vec<Asset> = removed_unchecked(snapshot, &scoped)
        .into_iter()
        .filter(Asset::is_custom)
        .collect();
    let purged_ids: HashSet<&str> = purged.iter().map(Asset::id).collect();
    let tiered: Vec<Asset> = tiered
        .into_iter()
        .filter(|asset| !purged_ids.contains(asset.id()))
        .collect();

    info!(
        untiered = new_entries.len(),
        purged = purged.len(),
        "Compared tenant snapshot with tiered collection"
    );

    UntieredReport {
        new_entries,
        purged,
        tiered,
    }
}
