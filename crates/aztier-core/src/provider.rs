//! Seams to the remote systems that feed the workflows.
//!
//! Implementations live in connector crates; tests substitute in-memory fakes.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{Asset, AssetCategory, ObservedAsset};

/// The upstream catalogue of tiered built-in assets.
#[async_trait]
pub trait UpstreamCatalogue: Send + Sync {
    /// Error type returned by the catalogue.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the tiered assets the catalogue publishes for a category.
    async fn tiered_assets(&self, category: AssetCategory) -> Result<Vec<Asset>, Self::Error>;
}

/// The live tenant's role and permission inventory.
#[async_trait]
pub trait TenantInventory: Send + Sync {
    /// Error type returned by the inventory.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the definitions the untiered detector compares against the
    /// tiered collection. Empty for categories without custom definitions.
    async fn observed_assets(
        &self,
        category: AssetCategory,
    ) -> Result<Vec<ObservedAsset>, Self::Error>;

    /// Returns a map from normalized display name to definition id.
    ///
    /// Keys are produced by [`normalize_name`].
    async fn definition_ids(
        &self,
        category: AssetCategory,
    ) -> Result<HashMap<String, String>, Self::Error>;
}

/// Normalizes a display name for id lookups: lowercase, spaces removed.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase()
}
