//! Pillfeed — drug-safety reference data loader.
//! Entry point for the batch CLI.

use clap::{Parser, Subcommand};
use pillfeed_config::Config;
use pillfeed_db::{OverviewRepository, RestrictionRepository};
use pillfeed_ingestion::{run_harvest, run_normalize, EasyDrugClient};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pillfeed", version, about = "Drug-safety reference data loader")]
struct Cli {
    /// Path to pillfeed.toml (defaults to PILLFEED_CONFIG, then ./pillfeed.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the remote drug catalog and upsert overview records
    Harvest,
    /// Rebuild the restriction snapshot tables from the categorized extracts
    Normalize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pillfeed=debug,info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let pool = pillfeed_db::connect(&config.database).await?;

    match cli.command {
        Command::Harvest => {
            info!("Starting harvest run");
            let client = EasyDrugClient::new(&config.catalog)?;
            let repo = OverviewRepository::new(pool);
            let result = run_harvest(&client, &repo).await?;
            info!(
                pages = result.pages_processed,
                records = result.total_records,
                stop_reason = ?result.stop_reason,
                "Harvest complete"
            );
        }
        Command::Normalize => {
            info!("Starting normalizer run");
            let repo = RestrictionRepository::new(pool);
            let result = run_normalize(&config.restrictions, &repo).await?;
            info!(
                records = result.total_records,
                failed_files = result.errors.len(),
                "Normalize complete"
            );
        }
    }

    Ok(())
}
