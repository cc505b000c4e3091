//! Crosslink Atlas offline importer

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;

use xlink_common::logging::{init_logging, LogConfig, LogLevel};
use xlink_server::{
    config::{DatabaseConfig, IngestConfig, UniProtConfig},
    db::{self, PgStore, SharedStore},
    features::organelles::commands::seed as seed_organelles,
    features::proteins::commands::import_fasta::{self, ImportFastaCommand},
    ingest::{seed_directory, CrosslinkImporter, ImporterSettings},
    parsers::fasta::FastaParser,
    uniprot::UniProtClient,
};

#[derive(Parser, Debug)]
#[command(name = "xlink-ingest")]
#[command(author, version, about = "Crosslink Atlas offline importer")]
struct Cli {
    #[command(subcommand)]
    task: Task,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Insert the organelle catalog
    Organelles,

    /// Import every Organism_Organelle.csv file of a directory
    Seed {
        /// Directory holding the CSV files
        #[arg(short, long, default_value = "./static/csv")]
        dir: PathBuf,

        /// Owner of the imported datasets
        #[arg(long, env = "XLINK_SERVICE_ACCOUNT_EMAIL")]
        account: Option<String>,
    },

    /// Import proteins from a FASTA archive
    Fasta {
        /// FASTA file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut log_config = LogConfig::for_service("xlink-ingest", "").apply_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    let _log_guard = init_logging(&log_config)?;

    let database = DatabaseConfig::from_env();
    database.validate()?;
    let pool = db::create_pool(&database).await?;
    db::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    let store: SharedStore = Arc::new(PgStore::new(pool));

    match cli.task {
        Task::Organelles => {
            let organelles = seed_organelles::handle(store.as_ref()).await?;
            info!(count = organelles.len(), "Organelle catalog seeded");
        }
        Task::Seed { dir, account } => {
            let uniprot = UniProtConfig::from_env();
            uniprot.validate()?;
            let ingest = IngestConfig::from_env();
            ingest.validate()?;

            let lookup = UniProtClient::new(
                uniprot.base_url.clone(),
                Duration::from_secs(uniprot.timeout_secs),
            )?;
            let settings = ImporterSettings {
                upload_dir: ingest.upload_dir.clone(),
                chunk_size: ingest.crosslink_chunk_size,
                concurrency: uniprot.concurrency,
                organelle_case_insensitive: ingest.organelle_case_insensitive,
            };
            let importer = CrosslinkImporter::new(store.clone(), Arc::new(lookup), settings)?;
            let account = account.unwrap_or(ingest.service_account_email);

            let report = seed_directory(store.as_ref(), &importer, &dir, &account).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.failed.is_empty() {
                anyhow::bail!("{} file(s) failed to import", report.failed.len());
            }
        }
        Task::Fasta { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parser = FastaParser::new()?;
            let report =
                import_fasta::handle(store.as_ref(), &parser, ImportFastaCommand { content }).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    info!("Import complete");
    Ok(())
}
