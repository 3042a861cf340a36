//! aztier - keeps an administrative tiering catalogue in sync
//!
//! The catalogue repository holds, per category, a tiered JSON record, a
//! README.md with one table per tier, and an addendum of untiered roles.
//! This CLI:
//! - Merges the upstream catalogue into the local records
//! - Records roles in use in the tenant that have no tier yet
//! - Converts between the JSON records and the Markdown documents

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use aztier_cli::commands;
use aztier_cli::error::CliResult;
use aztier_cli::logging;
use aztier_store::CatalogueLayout;

/// aztier - Azure administrative tiering catalogue tools
#[derive(Parser)]
#[command(name = "aztier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Root of the catalogue repository
    #[arg(long, global = true, env = "AZTIER_ROOT", default_value = ".")]
    root: PathBuf,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge upstream built-in tiers into the local records
    Sync(commands::sync::SyncArgs),

    /// Record untiered roles found in the tenant
    Watch(commands::watch::WatchArgs),

    /// Rebuild the JSON records from the Markdown documents
    MdToJson(commands::md_to_json::MdToJsonArgs),

    /// Rewrite the Markdown tier tables from the JSON records
    JsonToMd(commands::json_to_md::JsonToMdArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let layout = CatalogueLayout::new(cli.root);

    match cli.command {
        Commands::Sync(args) => commands::sync::execute(layout, args).await,
        Commands::Watch(args) => commands::watch::execute(layout, args).await,
        Commands::MdToJson(args) => commands::md_to_json::execute(layout, args).await,
        Commands::JsonToMd(args) => commands::json_to_md::execute(layout, args),
    }
}
