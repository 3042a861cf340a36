//! Diff engine for asset collections.
//!
//! Collections are compared by `id` only. `extended` is the candidate
//! (current) state and `base` the prior snapshot. The checked functions
//! enforce `|extended| >= |base|`; [`compare`] does not, for workflows where
//! an upstream catalogue may legitimately shrink.

use std::collections::HashSet;

use crate::{Asset, CoreError, CoreResult, Identified};

/// Result of comparing two asset collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetDiff {
    /// Assets of `extended` whose id is absent from `base`.
    pub added: Vec<Asset>,
    /// Upstream versions of assets whose shared fields differ.
    pub modified: Vec<Asset>,
    /// Assets of `base` whose id is absent from `extended`.
    pub removed: Vec<Asset>,
}

impl AssetDiff {
    /// Returns the count of all changes.
    #[must_use]
    pub fn changes_count(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// Returns the assets of `extended` whose id does not appear in `base`, in
/// `extended` order.
///
/// # Errors
///
/// Returns `InvalidArgument` if `extended` is shorter than `base`.
pub fn find_added<E, B>(extended: &[E], base: &[B]) -> CoreResult<Vec<E>>
where
    E: Identified + Clone,
    B: Identified,
{
    ensure_extended_shape(extended.len(), base.len())?;
    Ok(added_unchecked(extended, base))
}

/// Returns the assets of `base` whose id does not appear in `extended`, in
/// `base` order.
///
/// # Errors
///
/// Returns `InvalidArgument` if `extended` is shorter than `base`.
pub fn find_removed<E, B>(extended: &[E], base: &[B]) -> CoreResult<Vec<B>>
where
    E: Identified,
    B: Identified + Clone,
{
    ensure_extended_shape(extended.len(), base.len())?;
    Ok(removed_unchecked(extended, base))
}

/// Returns the `extended` version of every asset present in both collections
/// whose shared fields differ, in `base` order.
///
/// # Errors
///
/// Returns `InvalidArgument` if `extended` is shorter than `base`.
pub fn find_modified(extended: &[Asset], base: &[Asset]) -> CoreResult<Vec<Asset>> {
    ensure_extended_shape(extended.len(), base.len())?;
    Ok(modified_unchecked(extended, base))
}

/// Computes additions, modifications and removals in one pass, without the
/// length precondition.
#[must_use]
pub fn compare(extended: &[Asset], base: &[Asset]) -> AssetDiff {
    AssetDiff {
        added: added_unchecked(extended, base),
        modified: modified_unchecked(extended, base),
        removed: removed_unchecked(extended, base),
    }
}

fn ensure_extended_shape(extended_len: usize, base_len: usize) -> CoreResult<()> {
    if extended_len < base_len {
        return Err(CoreError::InvalidArgument(format!(
            "the extended collection ({extended_len} assets) must be at least as long as the base collection ({base_len} assets)"
        )));
    }
    Ok(())
}

pub(crate) fn added_unchecked<E, B>(extended: &[E], base: &[B]) -> Vec<E>
where
    E: Identified + Clone,
    B: Identified,
{
    let base_ids: HashSet<&str> = base.iter().map(Identified::id).collect();
    first_of_each(extended)
        .filter(|asset| !base_ids.contains(asset.id()))
        .cloned()
        .collect()
}

pub(crate) fn removed_unchecked<E, B>(extended: &[E], base: &[B]) -> Vec<B>
where
    E: Identified,
    B: Identified + Clone,
{
    let extended_ids: HashSet<&str> = extended.iter().map(Identified::id).collect();
    first_of_each(base)
        .filter(|asset| !extended_ids.contains(asset.id()))
        .cloned()
        .collect()
}

pub(crate) fn modified_unchecked(extended: &[Asset], base: &[Asset]) -> Vec<Asset> {
    first_of_each(base)
        .filter_map(|base_asset| {
            let extended_asset = extended.iter().find(|e| e.id() == base_asset.id())?;
            base_asset
                .differs_from(extended_asset)
                .then(|| extended_asset.clone())
        })
        .collect()
}

/// Yields the first asset for each distinct id, preserving order.
fn first_of_each<T: Identified>(assets: &[T]) -> impl Iterator<Item = &T> {
    let mut seen: HashSet<&str> = HashSet::new();
    assets.iter().filter(move |asset| seen.insert(asset.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn asset(value: Value) -> Asset {
        Asset::from_value(value).unwrap()
    }

    fn role(id: &str, tier: &str) -> Asset {
        asset(json!({"tier": tier, "id": id, "assetName": format!("Role {id}")}))
    }

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(Asset::id).collect()
    }

    #[test]
    fn test_find_added_in_extended_order() {
        let base = vec![role("1", "0")];
        let extended = vec![role("3", "0"), role("1", "0"), role("2", "1")];

        let added = find_added(&extended, &base).unwrap();
        assert_eq!(ids(&added), vec!["3", "2"]);
    }

    #[test]
    fn test_find_added_empty_when_subset() {
        let base = vec![role("1", "0"), role("2", "0")];
        let extended = vec![role("2", "0"), role("1", "0")];

        assert!(find_added(&extended, &base).unwrap().is_empty());
    }

    #[test]
    fn test_added_partitions_extended() {
        let base = vec![role("1", "0"), role("4", "2")];
        let extended = vec![role("1", "0"), role("2", "1"), role("3", "1"), role("4", "2")];

        let added = find_added(&extended, &base).unwrap();
        let base_ids: HashSet<&str> = base.iter().map(Asset::id).collect();
        let matched: Vec<&Asset> = extended
            .iter()
            .filter(|a| base_ids.contains(a.id()))
            .collect();

        assert_eq!(added.len() + matched.len(), extended.len());
        for a in &extended {
            let in_added = added.iter().any(|x| x.id() == a.id());
            let in_matched = matched.iter().any(|x| x.id() == a.id());
            assert!(in_added ^ in_matched);
        }
    }

    #[test]
    fn test_find_removed_in_base_order() {
        let base = vec![role("1", "0"), role("2", "0"), role("3", "0")];
        let extended = vec![role("2", "0"), role("4", "0"), role("5", "0")];

        let removed = find_removed(&extended, &base).unwrap();
        assert_eq!(ids(&removed), vec!["1", "3"]);
    }

    #[test]
    fn test_find_removed_empty_iff_all_base_present() {
        let base = vec![role("1", "0"), role("2", "0")];
        let extended = vec![role("1", "0"), role("2", "0"), role("3", "0")];
        assert!(find_removed(&extended, &base).unwrap().is_empty());

        let extended = vec![role("1", "0"), role("3", "0"), role("4", "0")];
        assert_eq!(ids(&find_removed(&extended, &base).unwrap()), vec!["2"]);
    }

    #[test]
    fn test_precondition_rejects_shorter_extended() {
        let base = vec![role("1", "0"), role("2", "0")];
        let extended = vec![role("1", "0")];

        assert!(matches!(
            find_added(&extended, &base),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            find_removed(&extended, &base),
            Err(CoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            find_modified(&extended, &base),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_find_modified_returns_extended_record_once() {
        let base = vec![asset(json!({
            "tier": "0", "id": "1", "assetType": "Built-in", "assetName": "Owner", "example": "old"
        }))];
        let extended = vec![asset(json!({
            "tier": "1", "id": "1", "assetName": "Owner", "example": "new"
        }))];

        let modified = find_modified(&extended, &base).unwrap();
        assert_eq!(modified.len(), 1);
        assert_eq!(modified[0].get_str("tier"), Some("1"));
        assert_eq!(modified[0].get_str("example"), Some("new"));
    }

    #[test]
    fn test_find_modified_ignores_unshared_fields() {
        let base = vec![asset(json!({"id": "1", "tier": "0", "assetType": "Built-in"}))];
        let extended = vec![asset(json!({"id": "1", "tier": "0", "example": "x"}))];

        assert!(find_modified(&extended, &base).unwrap().is_empty());
    }

    #[test]
    fn test_find_modified_deep_equality() {
        let base = vec![asset(json!({"id": "1", "scopes": {"a": 1, "b": [1, 2]}}))];
        let same = vec![asset(json!({"id": "1", "scopes": {"b": [1, 2], "a": 1}}))];
        let different = vec![asset(json!({"id": "1", "scopes": {"a": 1, "b": [2, 1]}}))];

        assert!(find_modified(&same, &base).unwrap().is_empty());
        assert_eq!(find_modified(&different, &base).unwrap().len(), 1);
    }

    #[test]
    fn test_find_modified_skips_missing_counterpart() {
        let base = vec![role("1", "0")];
        let extended = vec![role("2", "1")];

        assert!(find_modified(&extended, &base).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_first_match_wins() {
        let base = vec![role("1", "0")];
        let extended = vec![role("2", "0"), role("2", "3"), role("1", "2"), role("1", "0")];

        let added = find_added(&extended, &base).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].get_str("tier"), Some("0"));

        let modified = find_modified(&extended, &base).unwrap();
        assert_eq!(modified.len(), 1);
        assert_eq!(modified[0].get_str("tier"), Some("2"));
    }

    #[test]
    fn test_compare_allows_shrinking_extended() {
        let base = vec![role("1", "0"), role("2", "0")];
        let extended = vec![role("2", "1")];

        let diff = compare(&extended, &base);
        assert!(diff.added.is_empty());
        assert_eq!(ids(&diff.modified), vec!["2"]);
        assert_eq!(ids(&diff.removed), vec!["1"]);
        assert_eq!(diff.changes_count(), 2);
    }
}
