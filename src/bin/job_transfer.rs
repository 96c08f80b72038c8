//! # Job Transfer
//!
//! Command-line tool for exporting a namespace's job definitions to JSON and
//! importing them into another namespace or environment.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use partition_core::config::{ConfigManager, LoggingConfig};
use partition_core::database::DatabaseConnection;
use partition_core::logging::init_structured_logging;
use partition_core::store::PgJobStore;
use partition_core::{ExportJobFilter, JobStatus, JobTransferService, NamespaceContext};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "job-transfer")]
#[command(about = "Export and import scheduler job definitions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Namespace the jobs belong to
    #[arg(short, long, global = true, default_value = "default")]
    namespace: String,

    /// Configuration directory path (default: config)
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to load (default: PARTITION_ENV, APP_ENV, development)
    #[arg(short, long, global = true)]
    environment: Option<String>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export jobs as a JSON array
    Export {
        /// Exact group name
        #[arg(long)]
        group: Option<String>,

        /// Job name prefix
        #[arg(long)]
        name: Option<String>,

        /// Job status (0 = disabled, 1 = enabled)
        #[arg(long)]
        status: Option<i16>,

        /// Restrict to these job ids
        #[arg(long, value_delimiter = ',')]
        ids: Vec<i64>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import jobs from a JSON array; all or nothing
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Load and validate configuration without touching the database
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("job-transfer failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let environment = cli
        .environment
        .clone()
        .unwrap_or_else(ConfigManager::detect_environment);
    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &environment)
        .context("loading configuration")?;
    let config = manager.config();

    init_structured_logging(&logging_for_verbosity(&config.logging, cli.verbose));

    let ctx = NamespaceContext::new(cli.namespace.clone());

    match cli.command {
        Commands::CheckConfig => {
            println!("Environment: {}", manager.environment());
            println!("Config Directory: {}", manager.config_directory().display());
            println!("Database: {}", redact_url(&config.database.url));
            println!("Max Connections: {}", config.database.max_connections);
            println!("Export Page Size: {}", config.export.page_size);
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Export {
            group,
            name,
            status,
            ids,
            output,
        } => {
            let job_status = status
                .map(JobStatus::try_from)
                .transpose()
                .map_err(anyhow::Error::msg)?;
            let filter = ExportJobFilter {
                group_name: group,
                job_name: name,
                job_status,
                job_ids: ids,
            };

            let db = DatabaseConnection::new(&config.database)
                .await
                .context("connecting to database")?;
            let store = PgJobStore::new(db.pool().clone());
            let service = JobTransferService::new(store, config.export);

            let json = service.export_jobs(&ctx, &filter).await?;
            match output {
                Some(path) => {
                    fs::write(&path, &json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "Export written");
                }
                None => println!("{json}"),
            }

            db.close().await;
            Ok(())
        }
        Commands::Import { input } => {
            let json = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            if json.trim().is_empty() {
                bail!("{} is empty", input.display());
            }

            let db = DatabaseConnection::new(&config.database)
                .await
                .context("connecting to database")?;
            let store = PgJobStore::new(db.pool().clone());
            let service = JobTransferService::new(store, config.export);

            let summary = service.import_jobs_json(&ctx, &json).await?;
            println!(
                "Imported {} job(s) into namespace '{}'",
                summary.imported, ctx.namespace_id
            );

            db.close().await;
            Ok(())
        }
    }
}

fn logging_for_verbosity(base: &LoggingConfig, verbose: u8) -> LoggingConfig {
    let level = match verbose {
        0 => return base.clone(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    LoggingConfig {
        level: Some(level.to_string()),
        ..base.clone()
    }
}

/// Hide credentials in a connection url
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
