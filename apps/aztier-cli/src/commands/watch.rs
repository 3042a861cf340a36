//! Detect roles in use in the tenant that have no tier yet

use chrono::{NaiveDate, Utc};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

use aztier_connector_azure::{AccessTokens, AzureEndpoints, AzureTenant};
use aztier_core::{detect_untiered, AssetCategory, DetectorScope, TenantInventory};
use aztier_store::{CatalogueLayout, UntieredAddendum};

use crate::error::{CliError, CliResult};
use crate::logging;
use crate::state::TierState;

/// Categories the tenant is watched for.
pub const WATCHED_CATEGORIES: [AssetCategory; 2] =
    [AssetCategory::AzureRole, AssetCategory::EntraRole];

/// Record untiered roles found in the tenant and purge deleted custom roles
#[derive(Args, Debug, Default)]
pub struct WatchArgs {
    /// Discovery date for new entries (YYYY-MM-DD), defaults to today (UTC)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Outcome of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOutcome {
    pub category: AssetCategory,
    /// Whether new entries were appended to the addendum.
    pub added: bool,
    /// Number of custom entries removed from the tiered record.
    pub purged: usize,
}

impl WatchOutcome {
    pub fn status_lines(&self) -> Vec<String> {
        let (all, custom) = match self.category {
            AssetCategory::AzureRole => ("Azure roles", "Custom Azure roles"),
            _ => ("Custom Entra roles", "Custom Entra roles"),
        };

        let mut lines = Vec::new();
        if self.added {
            lines.push(format!("{all}: additions have been detected"));
        }
        if self.purged > 0 {
            lines.push(format!("{custom}: removals have been detected and applied"));
        }
        if lines.is_empty() {
            lines.push(format!("{all}: no changes"));
        }
        lines
    }
}

/// Execute the watch command
pub async fn execute(layout: CatalogueLayout, args: WatchArgs) -> CliResult<()> {
    let tokens = AccessTokens::from_env()?;
    let tenant = AzureTenant::new(tokens, AzureEndpoints::default())?;
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let outcomes = run(&layout, &tenant, date).await?;
    logging::report(outcomes.iter().flat_map(WatchOutcome::status_lines));
    Ok(())
}

/// Compare the tenant with the tiered records, purge custom entries the
/// tenant no longer has and append untiered ones to each addendum.
///
/// Every snapshot is taken before anything is written.
pub async fn run<T>(
    layout: &CatalogueLayout,
    tenant: &T,
    date: NaiveDate,
) -> CliResult<Vec<WatchOutcome>>
where
    T: TenantInventory,
    CliError: From<T::Error>,
{
    let mut state = TierState::load(layout.clone(), &WATCHED_CATEGORIES)?;
    let mut addenda: Vec<(PathBuf, UntieredAddendum)> = Vec::new();
    let mut outcomes = Vec::with_capacity(WATCHED_CATEGORIES.len());

    for category in WATCHED_CATEGORIES {
        let (Some(scope), Some(path)) = (
            DetectorScope::for_category(category),
            layout.untiered_path(category),
        ) else {
            warn!(%category, "Category has no untiered detection, skipping");
            continue;
        };

        let snapshot = tenant.observed_assets(category).await?;
        let report = detect_untiered(&snapshot, state.records(category).to_vec(), scope, date);

        let mut addendum = UntieredAddendum::load(&path, category)?;
        let added = addendum.append(&report.new_entries);
        if added {
            addenda.push((path, addendum));
        }

        let purged = report.purged.len();
        if report.has_purged() {
            state.update(category, report.tiered);
        }

        info!(%category, added, purged, "Tenant compared with tiered record");
        outcomes.push(WatchOutcome {
            category,
            added,
            purged,
        });
    }

    state.persist()?;
    for (path, addendum) in &addenda {
        addendum.save(path)?;
    }

    Ok(outcomes)
}
