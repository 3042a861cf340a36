//! Merge the upstream catalogue into the local tiered records

use clap::Args;
use tracing::info;

use aztier_connector_azure::{AatCatalogue, AzureEndpoints};
use aztier_core::{reconcile, AssetCategory, ReconcileOutcome, UpstreamCatalogue};
use aztier_store::CatalogueLayout;

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::logging;
use crate::state::TierState;

/// Merge upstream built-in tiers into the local records
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

/// Outcome of a sync run, per category.
#[derive(Debug)]
pub struct SyncReport {
    pub outcomes: Vec<(AssetCategory, ReconcileOutcome)>,
    /// Number of record files written.
    pub written: usize,
}

impl SyncReport {
    pub fn status_lines(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|(category, outcome)| outcome.status_line(*category))
            .collect()
    }
}

/// Execute the sync command
pub async fn execute(layout: CatalogueLayout, args: SyncArgs) -> CliResult<()> {
    let settings = Settings::load(&layout.config_path())?;

    let mut endpoints = AzureEndpoints::default();
    if let Some(base) = &settings.upstream_base_url {
        endpoints = endpoints.with_upstream(base)?;
    }
    let catalogue = AatCatalogue::new(endpoints)?;

    let report = run(&layout, settings.keep_local_changes, &catalogue, args.dry_run).await?;
    logging::report(report.status_lines());
    if args.dry_run {
        println!("Dry run: no file was written.");
    }
    Ok(())
}

/// Reconcile every category with `upstream` and write the records that
/// changed.
///
/// All categories are fetched and merged before anything is written.
pub async fn run<U>(
    layout: &CatalogueLayout,
    keep_local_changes: bool,
    upstream: &U,
    dry_run: bool,
) -> CliResult<SyncReport>
where
    U: UpstreamCatalogue,
    CliError: From<U::Error>,
{
    let mut state = TierState::load(layout.clone(), &AssetCategory::ALL)?;
    let mut outcomes = Vec::with_capacity(AssetCategory::ALL.len());

    for category in AssetCategory::ALL {
        let upstream_assets = upstream.tiered_assets(category).await?;
        let local = state.records(category).to_vec();
        let outcome = reconcile(category, keep_local_changes, &upstream_assets, local)?;

        if outcome.content_changed {
            state.update(category, outcome.assets.clone());
        }
        outcomes.push((category, outcome));
    }

    let written = if dry_run { 0 } else { state.persist()? };
    info!(written, keep_local_changes, "Sync finished");

    Ok(SyncReport { outcomes, written })
}
