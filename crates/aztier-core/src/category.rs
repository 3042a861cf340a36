//! Asset categories and their per-category policy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::AssetType;

/// The three catalogues maintained by the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    /// Azure RBAC role definitions.
    AzureRole,
    /// Entra ID directory roles.
    EntraRole,
    /// Microsoft Graph application permissions.
    MsGraphAppPermission,
}

/// How reconciliation treats a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPolicy {
    /// Whether field-level changes from upstream may replace local built-ins.
    pub supports_modification_merge: bool,
    /// Ownership type stamped on every asset taken from upstream.
    pub enrich_as: AssetType,
}

impl AssetCategory {
    /// All categories, in processing order.
    pub const ALL: [AssetCategory; 3] = [
        AssetCategory::AzureRole,
        AssetCategory::EntraRole,
        AssetCategory::MsGraphAppPermission,
    ];

    /// Human-readable label used in status output.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AssetCategory::AzureRole => "Azure roles",
            AssetCategory::EntraRole => "Entra roles",
            AssetCategory::MsGraphAppPermission => "MS Graph app permissions",
        }
    }

    /// Directory holding the category's files, relative to the project root.
    #[must_use]
    pub fn directory(&self) -> &'static str {
        match self {
            AssetCategory::AzureRole => "Azure roles",
            AssetCategory::EntraRole => "Entra roles",
            AssetCategory::MsGraphAppPermission => "Microsoft Graph application permissions",
        }
    }

    /// File name of the structured record.
    #[must_use]
    pub fn record_file_name(&self) -> &'static str {
        match self {
            AssetCategory::AzureRole => "tiered-azure-roles.json",
            AssetCategory::EntraRole => "tiered-entra-roles.json",
            AssetCategory::MsGraphAppPermission => "tiered-msgraph-app-permissions.json",
        }
    }

    /// File name of the untiered addendum, for categories that have one.
    #[must_use]
    pub fn untiered_file_name(&self) -> Option<&'static str> {
        match self {
            AssetCategory::AzureRole => Some("Untiered Azure roles.md"),
            AssetCategory::EntraRole => Some("Untiered custom Entra roles.md"),
            AssetCategory::MsGraphAppPermission => None,
        }
    }

    /// Number of tier sections in the category's document.
    #[must_use]
    pub fn tier_count(&self) -> u8 {
        match self {
            AssetCategory::AzureRole => 4,
            AssetCategory::EntraRole | AssetCategory::MsGraphAppPermission => 3,
        }
    }

    /// Reconciliation policy for the category.
    #[must_use]
    pub fn policy(&self) -> CategoryPolicy {
        match self {
            AssetCategory::AzureRole | AssetCategory::EntraRole => CategoryPolicy {
                supports_modification_merge: true,
                enrich_as: AssetType::BuiltIn,
            },
            // Upstream only defines additions and removals for permissions.
            AssetCategory::MsGraphAppPermission => CategoryPolicy {
                supports_modification_merge: false,
                enrich_as: AssetType::BuiltIn,
            },
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
