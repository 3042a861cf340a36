//! Rebuild the tiered records from the tier documents

use clap::Args;
use tracing::{info, warn};

use aztier_connector_azure::{AccessTokens, AzureEndpoints, AzureTenant};
use aztier_core::{AssetCategory, TenantInventory};
use aztier_store::{load_document, parse_document, CatalogueLayout};

use crate::error::{CliError, CliResult};
use crate::logging;
use crate::state::TierState;

/// Convert each README.md tier table into its tiered JSON record
#[derive(Args, Debug, Default)]
pub struct MdToJsonArgs {}

/// Result of converting one category's document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub category: AssetCategory,
    pub count: usize,
    /// Names no tenant definition id was found for; stored with an empty id.
    pub unresolved: Vec<String>,
}

impl Conversion {
    /// Status lines for the operator.
    #[must_use]
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{}: {} entries converted from Markdown",
            self.category, self.count
        )];
        if !self.unresolved.is_empty() {
            lines.push(format!(
                "{}: no tenant id found for {}",
                self.category,
                self.unresolved.join(", ")
            ));
        }
        lines
    }
}

/// Execute the md-to-json command
pub async fn execute(layout: CatalogueLayout, _args: MdToJsonArgs) -> CliResult<()> {
    let tokens = AccessTokens::from_env()?;
    let tenant = AzureTenant::new(tokens, AzureEndpoints::default())?;

    let converted = run(&layout, &tenant).await?;
    logging::report(converted.iter().flat_map(Conversion::status_lines));
    Ok(())
}

/// Parse every category's document, resolving ids through `tenant`, and
/// replace the records with the result.
pub async fn run<T>(layout: &CatalogueLayout, tenant: &T) -> CliResult<Vec<Conversion>>
where
    T: TenantInventory,
    CliError: From<T::Error>,
{
    let mut state = TierState::empty(layout.clone());
    let mut converted = Vec::with_capacity(AssetCategory::ALL.len());

    for category in AssetCategory::ALL {
        let document = load_document(&layout.document_path(category))?;
        let ids = tenant.definition_ids(category).await?;
        let assets = parse_document(&document, category, &ids)?;

        let unresolved: Vec<String> = assets
            .iter()
            .filter(|a| a.id().is_empty())
            .map(|a| a.asset_name().to_string())
            .collect();
        if !unresolved.is_empty() {
            // Built-ins without an id are dropped by the next sync.
            warn!(%category, names = %unresolved.join(", "), "Entries stored without a tenant id");
        }
        info!(%category, count = assets.len(), "Document parsed");

        converted.push(Conversion {
            category,
            count: assets.len(),
            unresolved,
        });
        state.update(category, assets);
    }

    state.persist()?;
    Ok(converted)
}
