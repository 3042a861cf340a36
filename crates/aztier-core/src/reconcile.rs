//! Reconciliation of a local tiered collection with the upstream catalogue.
//!
//! One routine serves every category; [`CategoryPolicy`] decides whether
//! field-level modifications are merged. Custom assets are never touched.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::diff::compare;
use crate::{sort_catalogue, Asset, AssetCategory, CategoryPolicy, CoreError, CoreResult};

/// Operator-facing summary of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The collection changed and its size changed.
    Merged,
    /// The collection changed but kept its size: only local edits were replaced.
    Overridden,
    /// Nothing changed.
    Unchanged,
}

impl SyncStatus {
    /// Returns the status line suffix shown to operators.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            SyncStatus::Merged => "changes have been detected and merged from upstream",
            SyncStatus::Overridden => {
                "no changes detected upstream, but local changes have been overridden"
            }
            SyncStatus::Unchanged => "no changes",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of reconciling one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// The merged collection, in catalogue order.
    pub assets: Vec<Asset>,
    /// Number of upstream built-ins appended.
    pub added: usize,
    /// Number of local built-ins replaced by their upstream version.
    pub modified: usize,
    /// Number of local built-ins dropped because upstream no longer has them.
    pub removed: usize,
    /// Whether the merged collection differs from the input, order-sensitively.
    pub content_changed: bool,
    /// Whether the merged collection has a different size than the input.
    pub count_changed: bool,
}

impl ReconcileOutcome {
    /// Classifies the run for status output.
    #[must_use]
    pub fn status(&self) -> SyncStatus {
        match (self.content_changed, self.count_changed) {
            (false, _) => SyncStatus::Unchanged,
            (true, true) => SyncStatus::Merged,
            (true, false) => SyncStatus::Overridden,
        }
    }

    /// Formats the status line for a category.
    #[must_use]
    pub fn status_line(&self, category: AssetCategory) -> String {
        format!("Built-in {}: {}", category.label(), self.status())
    }
}

/// Reconciles `local` with the `upstream` catalogue for `category`.
///
/// Upstream entries explicitly typed `Custom` are ignored. When
/// `keep_local_changes` is set, only additions and removals are applied.
///
/// # Errors
///
/// Returns `MissingAsset` if a modified asset cannot be located in the
/// collection being merged.
pub fn reconcile(
    category: AssetCategory,
    keep_local_changes: bool,
    upstream: &[Asset],
    local: Vec<Asset>,
) -> CoreResult<ReconcileOutcome> {
    reconcile_with_policy(category.policy(), keep_local_changes, upstream, local)
}

/// Reconciles with an explicit policy.
///
/// # Errors
///
/// See [`reconcile`].
pub fn reconcile_with_policy(
    policy: CategoryPolicy,
    keep_local_changes: bool,
    upstream: &[Asset],
    local: Vec<Asset>,
) -> CoreResult<ReconcileOutcome> {
    let upstream_built_in: Vec<Asset> = upstream
        .iter()
        .filter(|asset| !asset.is_custom())
        .cloned()
        .map(|asset| asset.with_asset_type(policy.enrich_as))
        .collect();
    let local_built_in: Vec<Asset> = local.iter().filter(|a| a.is_built_in()).cloned().collect();

    let diff = compare(&upstream_built_in, &local_built_in);
    debug!(changes = diff.changes_count(), "Compared local built-ins with upstream");

    let mut merged = local.clone();

    // Built-ins are diffed against local built-ins only, so an added id can
    // still belong to a local custom entry.
    let local_ids: HashSet<&str> = local.iter().map(Asset::id).collect();
    let mut added_count = 0;
    for asset in diff.added {
        if local_ids.contains(asset.id()) {
            warn!(id = %asset.id(), name = %asset.asset_name(), "Upstream built-in shares its id with a local entry, not adding it");
            continue;
        }
        merged.push(asset);
        added_count += 1;
    }

    let mut modified_count = 0;
    if policy.supports_modification_merge && !keep_local_changes {
        for replacement in diff.modified {
            let position = merged
                .iter()
                .position(|a| a.is_built_in() && a.id() == replacement.id())
                .ok_or_else(|| CoreError::MissingAsset(replacement.id().to_string()))?;
            debug!(id = %replacement.id(), name = %replacement.asset_name(), "Replacing local built-in with upstream version");
            merged[position] = replacement;
            modified_count += 1;
        }
    }

    let removed_count = diff.removed.len();
    let removed_ids: HashSet<&str> = diff.removed.iter().map(Asset::id).collect();
    merged.retain(|asset| !(asset.is_built_in() && removed_ids.contains(asset.id())));

    let content_changed = merged != local;
    let count_changed = merged.len() != local.len();
    sort_catalogue(&mut merged);

    info!(
        added = added_count,
        modified = modified_count,
        removed = removed_count,
        keep_local_changes,
        "Reconciled local collection with upstream"
    );

    Ok(ReconcileOutcome {
        assets: merged,
        added: added_count,
        modified: modified_count,
        removed: removed_count,
        content_changed,
        count_changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn asset(value: Value) -> Asset {
        Asset::from_value(value).unwrap()
    }

    fn owner_local() -> Asset {
        asset(json!({"tier": "0", "id": "1", "assetType": "Built-in", "assetName": "Owner"}))
    }

    fn owner_upstream_tier1() -> Asset {
        asset(json!({"tier": "1", "id": "1", "assetName": "Owner"}))
    }

    fn custom_role() -> Asset {
        asset(json!({"tier": "2", "id": "2", "assetType": "Custom", "assetName": "Ops"}))
    }

    #[test]
    fn test_modification_applied_without_keep_local_changes() {
        let outcome = reconcile(
            AssetCategory::AzureRole,
            false,
            &[owner_upstream_tier1()],
            vec![owner_local()],
        )
        .unwrap();

        assert_eq!(outcome.assets.len(), 1);
        assert_eq!(outcome.assets[0].get_str("tier"), Some("1"));
        assert!(outcome.assets[0].is_built_in());
        assert_eq!(outcome.modified, 1);
        assert_eq!(outcome.status(), SyncStatus::Overridden);
    }

    #[test]
    fn test_upstream_id_owned_by_custom_entry_is_not_added() {
        let upstream = asset(json!({"tier": "0", "id": "2", "assetName": "Ops"}));

        let outcome = reconcile(
            AssetCategory::AzureRole,
            false,
            &[upstream],
            vec![custom_role()],
        )
        .unwrap();

        assert_eq!(outcome.assets, vec![custom_role()]);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.status(), SyncStatus::Unchanged);
    }

    #[test]
    fn test_keep_local_changes_retains_tier() {
        let outcome = reconcile(
            AssetCategory::AzureRole,
            true,
            &[owner_upstream_tier1()],
            vec![owner_local()],
        )
        .unwrap();

        assert_eq!(outcome.assets, vec![owner_local()]);
        assert_eq!(outcome.modified, 0);
        assert!(!outcome.content_changed);
        assert_eq!(outcome.status(), SyncStatus::Unchanged);
    }

    #[test]
    fn test_empty_upstream_removes_built_ins_and_keeps_custom() {
        let outcome = reconcile(
            AssetCategory::EntraRole,
            false,
            &[],
            vec![owner_local(), custom_role()],
        )
        .unwrap();

        assert_eq!(outcome.assets, vec![custom_role()]);
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.status(), SyncStatus::Merged);
    }

    #[test]
    fn test_custom_preserved_regardless_of_keep_local_changes() {
        let upstream = vec![
            owner_upstream_tier1(),
            asset(json!({"tier": "0", "id": "2", "assetName": "Ops upstream"})),
        ];

        for keep in [true, false] {
            let outcome = reconcile(
                AssetCategory::AzureRole,
                keep,
                &upstream,
                vec![owner_local(), custom_role()],
            )
            .unwrap();
            let custom: Vec<&Asset> = outcome.assets.iter().filter(|a| a.is_custom()).collect();
            assert_eq!(custom, vec![&custom_role()]);
        }
    }

    #[test]
    fn test_additions_are_enriched_and_sorted() {
        let upstream = vec![
            owner_upstream_tier1(),
            asset(json!({"tier": "0", "id": "3", "assetName": "Contributor", "example": "x"})),
        ];

        let outcome =
            reconcile(AssetCategory::AzureRole, true, &upstream, vec![owner_local()]).unwrap();

        assert_eq!(outcome.added, 1);
        let ids: Vec<&str> = outcome.assets.iter().map(Asset::id).collect();
        assert_eq!(ids, vec!["3", "1"]);

        let keys: Vec<&str> = outcome.assets[0]
            .fields()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["tier", "id", "assetType", "assetName", "example"]);
        assert_eq!(outcome.status(), SyncStatus::Merged);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let upstream = vec![
            owner_upstream_tier1(),
            asset(json!({"tier": "2", "id": "4", "assetName": "Reader"})),
        ];

        let first = reconcile(
            AssetCategory::AzureRole,
            false,
            &upstream,
            vec![owner_local(), custom_role()],
        )
        .unwrap();
        assert!(first.content_changed);

        let second =
            reconcile(AssetCategory::AzureRole, false, &upstream, first.assets.clone()).unwrap();
        assert!(!second.content_changed);
        assert_eq!(second.assets, first.assets);
    }

    #[test]
    fn test_permissions_do_not_merge_modifications() {
        let local = vec![asset(json!({
            "tier": "0", "id": "p1", "assetType": "Built-in", "assetName": "Directory.ReadWrite.All"
        }))];
        let upstream = vec![asset(json!({
            "tier": "1", "id": "p1", "assetName": "Directory.ReadWrite.All"
        }))];

        let outcome =
            reconcile(AssetCategory::MsGraphAppPermission, false, &upstream, local.clone()).unwrap();
        assert_eq!(outcome.assets, local);
    }

    #[test]
    fn test_upstream_custom_entries_are_ignored() {
        let upstream = vec![asset(json!({
            "tier": "0", "id": "9", "assetType": "Custom", "assetName": "Foreign"
        }))];

        let outcome = reconcile(AssetCategory::AzureRole, false, &upstream, vec![]).unwrap();
        assert!(outcome.assets.is_empty());
        assert!(!outcome.content_changed);
    }

    #[test]
    fn test_status_line() {
        let outcome = reconcile(AssetCategory::EntraRole, false, &[], vec![]).unwrap();
        assert_eq!(
            outcome.status_line(AssetCategory::EntraRole),
            "Built-in Entra roles: no changes"
        );
    }
}
