//! Rewrite the tier tables of each document from the tiered records

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use aztier_core::AssetCategory;
use aztier_store::{
    document_link_base, load_document, render_document, save_document, CatalogueLayout,
    DEFAULT_DOCUMENT_BASE,
};

use crate::config::DOCUMENT_BASE_URL_VAR;
use crate::error::CliResult;
use crate::logging;
use crate::state::TierState;

/// Render each tiered JSON record into the tables of its README.md
#[derive(Args, Debug)]
pub struct JsonToMdArgs {
    /// Base URL that built-in entry names link to
    #[arg(long, env = DOCUMENT_BASE_URL_VAR, default_value = DEFAULT_DOCUMENT_BASE)]
    pub document_base_url: String,
}

/// Execute the json-to-md command
pub fn execute(layout: CatalogueLayout, args: JsonToMdArgs) -> CliResult<()> {
    let rendered = run(&layout, &args.document_base_url)?;
    logging::report(
        rendered
            .iter()
            .map(|(category, count)| format!("{category}: {count} entries rendered to Markdown")),
    );
    Ok(())
}

/// Render every category's record into its document. Documents are written
/// only after all of them rendered. Returns the row count per category.
pub fn run(layout: &CatalogueLayout, document_base_url: &str) -> CliResult<Vec<(AssetCategory, usize)>> {
    let state = TierState::load(layout.clone(), &AssetCategory::ALL)?;
    let mut documents: Vec<(PathBuf, String)> = Vec::with_capacity(AssetCategory::ALL.len());
    let mut rendered = Vec::with_capacity(AssetCategory::ALL.len());

    for category in AssetCategory::ALL {
        let path = layout.document_path(category);
        let existing = load_document(&path)?;
        let link_base = document_link_base(document_base_url, category)?;
        let assets = state.records(category);

        let document = render_document(&existing, category, assets, &link_base)?;
        info!(%category, count = assets.len(), "Document rendered");

        rendered.push((category, assets.len()));
        documents.push((path, document));
    }

    for (path, document) in &documents {
        save_document(path, document)?;
    }
    Ok(rendered)
}
