//! Integration tests for untiered-role detection.

mod common;

use chrono::NaiveDate;
use common::*;
use serde_json::json;
use std::fs;

use aztier_cli::commands::watch::{self, WatchOutcome};
use aztier_core::{Asset, AssetCategory, AssetType};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn tiered_owner() -> Asset {
    asset(json!({"tier": "0", "id": "owner-id", "assetType": "Built-in", "assetName": "Owner"}))
}

fn tiered_custom(id: &str, name: &str) -> Asset {
    asset(json!({"tier": "2", "id": id, "assetType": "Custom", "assetName": name}))
}

fn azure_addendum(repo: &TestRepo) -> String {
    let path = repo.layout.untiered_path(AssetCategory::AzureRole).unwrap();
    fs::read_to_string(path).unwrap()
}

#[tokio::test]
async fn test_untiered_roles_are_recorded_once() {
    let repo = TestRepo::new();
    repo.write_record(AssetCategory::AzureRole, &[tiered_owner()]);
    let tenant = FakeTenant::default().observing(
        AssetCategory::AzureRole,
        vec![
            observed("owner-id", AssetType::BuiltIn, "Owner"),
            observed("kv-id", AssetType::BuiltIn, "Key Vault Administrator"),
            observed("backup-id", AssetType::BuiltIn, "Backup Operator"),
        ],
    );

    let first = watch::run(&repo.layout, &tenant, date(1)).await.unwrap();
    assert_eq!(
        first[0],
        WatchOutcome {
            category: AssetCategory::AzureRole,
            added: true,
            purged: 0
        }
    );
    assert_eq!(first[0].status_lines(), vec!["Azure roles: additions have been detected"]);

    let content = azure_addendum(&repo);
    let backup = content.find("[Backup Operator]").unwrap();
    let key_vault = content.find("[Key Vault Administrator]").unwrap();
    assert!(backup < key_vault);
    assert!(content.contains("| 2024-05-01 | [Backup Operator](https://management.azure.com/providers/Microsoft.Authorization/roleDefinitions/backup-id?api-version=2022-04-01) | Built-in | Backup Operator description |"));
    assert!(!content.contains("[Owner]"));

    let second = watch::run(&repo.layout, &tenant, date(2)).await.unwrap();
    assert!(!second[0].added);
    assert_eq!(second[0].status_lines(), vec!["Azure roles: no changes"]);
    assert_eq!(azure_addendum(&repo), content);
    assert_eq!(content.matches("[Backup Operator]").count(), 1);
}

#[tokio::test]
async fn test_new_entries_go_above_older_ones() {
    let repo = TestRepo::new();
    let mut tenant = FakeTenant::default().observing(
        AssetCategory::AzureRole,
        vec![observed("a-id", AssetType::BuiltIn, "Alpha Role")],
    );
    watch::run(&repo.layout, &tenant, date(1)).await.unwrap();

    tenant.observed.get_mut(&AssetCategory::AzureRole).unwrap().push(observed(
        "z-id",
        AssetType::Custom,
        "Zulu Role",
    ));
    watch::run(&repo.layout, &tenant, date(9)).await.unwrap();

    let content = azure_addendum(&repo);
    assert!(content.find("2024-05-09").unwrap() < content.find("2024-05-01").unwrap());
}

#[tokio::test]
async fn test_deleted_custom_roles_are_purged() {
    let repo = TestRepo::new();
    repo.write_record(
        AssetCategory::AzureRole,
        &[
            tiered_owner(),
            tiered_custom("gone-id", "Retired Custom"),
            tiered_custom("kept-id", "Live Custom"),
        ],
    );
    let tenant = FakeTenant::default().observing(
        AssetCategory::AzureRole,
        vec![observed("kept-id", AssetType::Custom, "Live Custom")],
    );

    let outcomes = watch::run(&repo.layout, &tenant, date(3)).await.unwrap();

    assert_eq!(outcomes[0].purged, 1);
    assert!(!outcomes[0].added);
    assert_eq!(
        outcomes[0].status_lines(),
        vec!["Custom Azure roles: removals have been detected and applied"]
    );
    // Built-in entries the tenant does not use stay tiered.
    assert_eq!(
        repo.read_record(AssetCategory::AzureRole),
        vec![tiered_owner(), tiered_custom("kept-id", "Live Custom")]
    );
    assert!(!repo.layout.untiered_path(AssetCategory::AzureRole).unwrap().exists());
}

#[tokio::test]
async fn test_entra_detection_only_considers_custom_roles() {
    let repo = TestRepo::new();
    repo.write_record(
        AssetCategory::EntraRole,
        &[
            asset(json!({"tier": "0", "id": "ga-id", "assetType": "Built-in", "assetName": "Global Administrator"})),
            tiered_custom("e1", "Helpdesk Plus"),
        ],
    );
    let tenant = FakeTenant::default().observing(
        AssetCategory::EntraRole,
        vec![
            observed("e1", AssetType::Custom, "Helpdesk Plus"),
            observed("e2", AssetType::Custom, "App Owner Lite"),
        ],
    );

    let outcomes = watch::run(&repo.layout, &tenant, date(4)).await.unwrap();
    let entra = &outcomes[1];

    assert_eq!(entra.category, AssetCategory::EntraRole);
    assert!(entra.added);
    assert_eq!(entra.purged, 0);
    assert_eq!(entra.status_lines(), vec!["Custom Entra roles: additions have been detected"]);

    let path = repo.layout.untiered_path(AssetCategory::EntraRole).unwrap();
    let content = fs::read_to_string(path).unwrap();
    assert!(content.starts_with("# Untiered custom Entra roles"));
    assert!(content.contains("[App Owner Lite]"));
    assert!(!content.contains("[Helpdesk Plus]"));
    assert_eq!(repo.read_record(AssetCategory::EntraRole).len(), 2);
}

#[tokio::test]
async fn test_existing_addendum_layout_is_preserved() {
    let repo = TestRepo::new();
    let path = repo.layout.untiered_path(AssetCategory::AzureRole).unwrap();
    repo.write_file(
        &path,
        "# Untiered Azure roles\n\nCurated notes.\n\n## Untiered roles\n\n| Date | Name | Type | Description |\n|---|---|---|---|\n| 2023-12-01 | [Alpha Role](https://old.test/a) | Built-in | Old |\n",
    );
    let tenant = FakeTenant::default().observing(
        AssetCategory::AzureRole,
        vec![
            observed("a-id", AssetType::BuiltIn, "Alpha Role"),
            observed("b-id", AssetType::BuiltIn, "Beta Role"),
        ],
    );

    watch::run(&repo.layout, &tenant, date(6)).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Untiered Azure roles\n\nCurated notes.\n"));
    assert_eq!(content.matches("[Alpha Role]").count(), 1);
    assert!(content.contains("|---|---|---|---|\n| 2024-05-06 | [Beta Role]"));
}
