//! Core of the aztier catalogue tooling.
//!
//! Holds the asset model shared by every representation of the catalogue
//! (structured record, Markdown document, live tenant), the id-keyed diff
//! engine, and the two workflows built on it:
//!
//! - [`reconcile`] merges the upstream catalogue into a local collection
//!   according to a per-category [`CategoryPolicy`].
//! - [`detect_untiered`] compares a tenant snapshot with the tiered
//!   collection.
//!
//! Remote systems are reached through the traits in [`provider`].

pub mod asset;
pub mod category;
pub mod diff;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod untiered;

pub use asset::{
    sort_catalogue, Asset, AssetType, Identified, FIELD_ASSET_NAME, FIELD_ASSET_TYPE,
    FIELD_ID, FIELD_TIER,
};
pub use category::{AssetCategory, CategoryPolicy};
pub use diff::{compare, find_added, find_modified, find_removed, AssetDiff};
pub use error::{CoreError, CoreResult};
pub use provider::{normalize_name, TenantInventory, UpstreamCatalogue};
pub use reconcile::{reconcile, reconcile_with_policy, ReconcileOutcome, SyncStatus};
pub use untiered::{detect_untiered, DetectorScope, ObservedAsset, UntieredEntry, UntieredReport};
