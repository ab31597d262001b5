//! t2k-sampler - draw a random sample from the chart dataset
//!
//! Resolves the dataset the same way the services do, installs it as the
//! process-wide catalog and prints one sample as JSON (`[[key, song], ...]`).
//! Useful for checking a freshly fetched dataset and for trying out query
//! constraints.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use t2k_common::api::ErrorResponse;
use t2k_common::config::{resolve_dataset_path, LoggingConfig, TomlConfig};
use t2k_common::{catalog, sampling, SampleQuery};

/// Command-line arguments for t2k-sampler
#[derive(Parser, Debug)]
#[command(name = "t2k-sampler")]
#[command(about = "Draw random songs from the Top 2000 dataset")]
#[command(version)]
struct Args {
    /// Number of songs to draw
    #[arg(short, long = "count", default_value = "1")]
    n: usize,

    /// Require a chart position in this year (repeatable)
    #[arg(short, long = "year")]
    years: Vec<String>,

    /// Never return this song key (repeatable)
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Also return songs without preview audio
    #[arg(long)]
    allow_silent: bool,

    /// Dataset file (overrides T2K_DATASET_PATH and the config file)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// TOML config file (defaults to the platform config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the chart years present in the dataset instead of sampling
    #[arg(long)]
    list_years: bool,
}

impl Args {
    fn query(&self) -> SampleQuery {
        let query = SampleQuery::new(self.n)
            .excluding(self.exclude.iter().cloned())
            .require_audio(!self.allow_silent);

        if self.years.is_empty() {
            query
        } else {
            query.with_years(self.years.iter().cloned())
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("t2k_common={0},t2k_sampler={0}", logging.level)));

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref());
    init_tracing(&config.logging)?;

    info!(
        "Starting t2k-sampler v{}",
        env!("CARGO_PKG_VERSION")
    );

    let dataset = resolve_dataset_path(args.dataset.as_deref(), &config);
    info!("Dataset path: {}", dataset.display());
    catalog::install(dataset)?;

    if args.list_years {
        let songs = catalog::get_catalog()
            .await
            .context("Failed to load catalog")?;
        let years: Vec<&str> = songs.years().into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&years)?);
        return Ok(ExitCode::SUCCESS);
    }

    match sampling::sample(&args.query()).await {
        Ok(picked) => {
            println!("{}", serde_json::to_string_pretty(&picked)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", serde_json::to_string_pretty(&ErrorResponse::from_error(&e))?);
            Ok(if e.status_code() == 404 {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
