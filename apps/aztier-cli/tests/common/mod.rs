//! Shared fixtures for CLI integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use aztier_connector_azure::AzureError;
use aztier_core::{
    normalize_name, Asset, AssetCategory, AssetType, ObservedAsset, TenantInventory,
    UpstreamCatalogue,
};
use aztier_store::{load_record, save_record, CatalogueLayout};

/// A catalogue repository in a temporary directory.
pub struct TestRepo {
    pub dir: TempDir,
    pub layout: CatalogueLayout,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let layout = CatalogueLayout::new(dir.path());
        Self { dir, layout }
    }

    pub fn write_record(&self, category: AssetCategory, assets: &[Asset]) {
        save_record(&self.layout.record_path(category), assets).unwrap();
    }

    pub fn read_record(&self, category: AssetCategory) -> Vec<Asset> {
        load_record(&self.layout.record_path(category)).unwrap()
    }

    pub fn record_text(&self, category: AssetCategory) -> Option<String> {
        fs::read_to_string(self.layout.record_path(category)).ok()
    }

    pub fn write_file(&self, path: &std::path::Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn write_config(&self, content: &str) {
        self.write_file(&self.layout.config_path(), content);
    }
}

pub fn asset(value: Value) -> Asset {
    Asset::from_value(value).unwrap()
}

pub fn observed(id: &str, asset_type: AssetType, name: &str) -> ObservedAsset {
    ObservedAsset {
        id: id.to_string(),
        asset_type,
        name: name.to_string(),
        description: format!("{name} description"),
        link: format!("https://management.azure.com/providers/Microsoft.Authorization/roleDefinitions/{id}?api-version=2022-04-01"),
    }
}

/// Upstream catalogue serving fixed records.
#[derive(Default)]
pub struct FakeCatalogue {
    pub records: HashMap<AssetCategory, Vec<Asset>>,
    pub failing: Option<AssetCategory>,
    pub calls: AtomicUsize,
}

impl FakeCatalogue {
    pub fn with(mut self, category: AssetCategory, assets: Vec<Asset>) -> Self {
        self.records.insert(category, assets);
        self
    }

    pub fn failing_on(mut self, category: AssetCategory) -> Self {
        self.failing = Some(category);
        self
    }
}

#[async_trait]
impl UpstreamCatalogue for FakeCatalogue {
    type Error = AzureError;

    async fn tiered_assets(&self, category: AssetCategory) -> Result<Vec<Asset>, AzureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing == Some(category) {
            return Err(AzureError::Api {
                status: 503,
                code: "ServiceUnavailable".to_string(),
                message: "catalogue unavailable".to_string(),
            });
        }
        Ok(self.records.get(&category).cloned().unwrap_or_default())
    }
}

/// Tenant serving fixed snapshots and name lookups.
#[derive(Default)]
pub struct FakeTenant {
    pub observed: HashMap<AssetCategory, Vec<ObservedAsset>>,
    pub ids: HashMap<AssetCategory, HashMap<String, String>>,
}

impl FakeTenant {
    pub fn observing(mut self, category: AssetCategory, assets: Vec<ObservedAsset>) -> Self {
        self.observed.insert(category, assets);
        self
    }

    pub fn with_ids(mut self, category: AssetCategory, names: &[(&str, &str)]) -> Self {
        let ids = names
            .iter()
            .map(|(name, id)| (normalize_name(name), (*id).to_string()))
            .collect();
        self.ids.insert(category, ids);
        self
    }
}

#[async_trait]
impl TenantInventory for FakeTenant {
    type Error = AzureError;

    async fn observed_assets(
        &self,
        category: AssetCategory,
    ) -> Result<Vec<ObservedAsset>, AzureError> {
        Ok(self.observed.get(&category).cloned().unwrap_or_default())
    }

    async fn definition_ids(
        &self,
        category: AssetCategory,
    ) -> Result<HashMap<String, String>, AzureError> {
        Ok(self.ids.get(&category).cloned().unwrap_or_default())
    }
}

pub const AZURE_DOCUMENT: &str = "# Azure roles

Roles tiered by their worst-case impact.

## Definitions

| Tier | Meaning |
|---|---|
| 0 | Family of Global Admins |

## Tier 0

| Azure role | Type | Shortest path | Example |
|---|---|---|---|
| [Owner](https://aat.test/Azure%20roles#owner) | Built-in | Assign any role | Grants itself more access |

## Tier 1

| Azure role | Type | Shortest path | Example |
|---|---|---|---|

## Tier 2

| Azure role | Type | Worst-case scenario |
|---|---|---|

## Tier 3

| Azure role | Type | Worst-case scenario |
|---|---|---|
| Ops Reader | Custom | Reads *operational* data |
";

pub const ENTRA_DOCUMENT: &str = "# Entra roles

## Definitions

| Tier | Meaning |
|---|---|
| 0 | Family of Global Admins |

## Tier 0

| Entra role | Type | Path type | Shortest path | Example |
|---|---|---|---|---|

## Tier 1

| Entra role | Type | Provides full access to |
|---|---|---|
| [Exchange Administrator](https://aat.test/Entra%20roles#exchange-administrator) | Built-in | Mailboxes |

## Tier 2

| Entra role | Type |
|---|---|
";

pub const GRAPH_DOCUMENT: &str = "# Microsoft Graph application permissions

## Definitions

| Tier | Meaning |
|---|---|
| 0 | Family of Global Admins |

## Tier 0

| Application permission | Type | Path type | Shortest path | Example |
|---|---|---|---|---|
| [RoleManagement.ReadWrite.Directory](https://aat.test/x#rolemanagement.readwrite.directory) | Built-in | Direct | Assign Global Admin \u{26A0}\u{FE0F} | `POST /roleAssignments` |

## Tier 1

| Application permission | Type |
|---|---|

## Tier 2

| Application permission | Type |
|---|---|
";

impl TestRepo {
    pub fn write_documents(&self) {
        for (category, content) in [
            (AssetCategory::AzureRole, AZURE_DOCUMENT),
            (AssetCategory::EntraRole, ENTRA_DOCUMENT),
            (AssetCategory::MsGraphAppPermission, GRAPH_DOCUMENT),
        ] {
            self.write_file(&self.layout.document_path(category), content);
        }
    }
}
