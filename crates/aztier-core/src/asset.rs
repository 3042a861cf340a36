//! Canonical record shape for a tiered asset.
//!
//! An asset is an ordered field map. A handful of fields have a fixed meaning
//! (`id`, `tier`, `assetType`, `assetName`); everything else is
//! category-specific description that the diff engine only compares for
//! equality. Field order is kept because it is visible in the persisted record.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Stable identifier field.
pub const FIELD_ID: &str = "id";
/// Tier classification field.
pub const FIELD_TIER: &str = "tier";
/// Ownership field (`Built-in` or `Custom`).
pub const FIELD_ASSET_TYPE: &str = "assetType";
/// Display name field.
pub const FIELD_ASSET_NAME: &str = "assetName";

/// Position of `assetType` in an enriched asset.
const ASSET_TYPE_POSITION: usize = 2;

/// Anything that can be matched across collections by a stable identifier.
pub trait Identified {
    /// Returns the identifier used as the sole matching key.
    fn id(&self) -> &str;
}

/// Who owns an asset definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    /// Defined by the platform vendor or the upstream catalogue.
    #[serde(rename = "Built-in")]
    BuiltIn,
    /// Created within the local tenant.
    Custom,
}

impl AssetType {
    /// Returns the persisted representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::BuiltIn => "Built-in",
            AssetType::Custom => "Custom",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "builtin" | "builtinrole" => Ok(AssetType::BuiltIn),
            "custom" | "customrole" => Ok(AssetType::Custom),
            _ => Err(CoreError::InvalidAssetType(s.to_string())),
        }
    }
}

/// A role or permission definition subject to tiered classification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Asset {
    fields: Map<String, Value>,
}

impl Asset {
    /// Builds an asset from an arbitrary JSON value, rejecting non-objects and
    /// records without a string `id`.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(CoreError::NotAnObject(truncate(&other.to_string()))),
        }
    }

    /// Builds a collection from a JSON array. `null` is treated as empty.
    pub fn collection_from_value(value: Value) -> CoreResult<Vec<Self>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            other => Err(CoreError::NotAnObject(truncate(&other.to_string()))),
        }
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        // Validated on construction.
        self.fields
            .get(FIELD_ID)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Returns the tier exactly as stored, for ordering and display.
    #[must_use]
    pub fn tier_label(&self) -> String {
        match self.fields.get(FIELD_TIER) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Returns the ownership type, if present and recognised.
    #[must_use]
    pub fn asset_type(&self) -> Option<AssetType> {
        self.get_str(FIELD_ASSET_TYPE)
            .and_then(|s| s.parse::<AssetType>().ok())
    }

    /// Returns true for assets owned by the upstream catalogue.
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        self.asset_type() == Some(AssetType::BuiltIn)
    }

    /// Returns true for tenant-owned assets.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.asset_type() == Some(AssetType::Custom)
    }

    /// Returns the display name, or an empty string when absent.
    #[must_use]
    pub fn asset_name(&self) -> &str {
        self.get_str(FIELD_ASSET_NAME).unwrap_or_default()
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns a field value when it is a string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    /// Returns all fields in their stored order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a copy enriched with `assetType`, placed as the third field.
    ///
    /// An existing `assetType` is replaced and moved to that position.
    #[must_use]
    pub fn with_asset_type(self, asset_type: AssetType) -> Self {
        let mut entries: Vec<(String, Value)> = self
            .fields
            .into_iter()
            .filter(|(key, _)| key != FIELD_ASSET_TYPE)
            .collect();

        let position = ASSET_TYPE_POSITION.min(entries.len());
        entries.insert(
            position,
            (
                FIELD_ASSET_TYPE.to_string(),
                Value::String(asset_type.as_str().to_string()),
            ),
        );

        Self {
            fields: entries.into_iter().collect(),
        }
    }

    /// Returns true if any field present in both assets holds a different value.
    ///
    /// Values are compared structurally; field order is irrelevant.
    #[must_use]
    pub fn differs_from(&self, other: &Asset) -> bool {
        self.fields.iter().any(|(key, value)| {
            other
                .fields
                .get(key)
                .is_some_and(|other_value| other_value != value)
        })
    }

    /// Ordering used for persisted collections: `(tier, assetName)` ascending.
    #[must_use]
    pub fn catalogue_order(&self, other: &Asset) -> Ordering {
        self.tier_label()
            .cmp(&other.tier_label())
            .then_with(|| self.asset_name().cmp(other.asset_name()))
    }
}

impl Identified for Asset {
    fn id(&self) -> &str {
        Asset::id(self)
    }
}

impl TryFrom<Map<String, Value>> for Asset {
    type Error = CoreError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get(FIELD_ID) {
            Some(Value::String(_)) => Ok(Self { fields }),
            _ => Err(CoreError::MissingAssetId(truncate(
                &Value::Object(fields).to_string(),
            ))),
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Sorts a collection into catalogue order. The sort is stable.
pub fn sort_catalogue(assets: &mut [Asset]) {
    assets.sort_by(Asset::catalogue_order);
}

fn truncate(raw: &str) -> String {
    const LIMIT: usize = 120;
    if raw.chars().count() <= LIMIT {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(LIMIT).collect();
        format!("{head}...")
    }
}
