//! Command-line interface components.

use crate::config::ReasConfig;
use crate::models::IngestStats;
use crate::pipeline::IngestionPipeline;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reas")]
#[command(about = "Load REAS emission tables into a label-addressable multidimensional store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory holding the REAS table files
    #[arg(value_name = "INPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Output directory for the store (default: INPUT_DIR/reas)
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// JSON configuration file; command-line options override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of fuel labels
    #[arg(long)]
    pub fuel_capacity: Option<usize>,

    /// Maximum number of combustion sector labels
    #[arg(long)]
    pub combustion_sector_capacity: Option<usize>,

    /// Maximum number of non-combustion sector labels
    #[arg(long)]
    pub non_combustion_sector_capacity: Option<usize>,

    /// Glob matched against file names in INPUT_DIR
    #[arg(long)]
    pub pattern: Option<String>,

    /// Discovery mode: scan file names, report labels, then exit
    #[arg(long)]
    pub discovery_only: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the run configuration from the config file and overrides
    pub fn to_config(&self) -> crate::error::Result<ReasConfig> {
        let mut config = match &self.config {
            Some(path) => ReasConfig::from_file(path)?,
            None => ReasConfig::default(),
        };

        if let Some(capacity) = self.fuel_capacity {
            config = config.with_fuel_capacity(capacity);
        }
        if let Some(capacity) = self.combustion_sector_capacity {
            config = config.with_combustion_sector_capacity(capacity);
        }
        if let Some(capacity) = self.non_combustion_sector_capacity {
            config = config.with_non_combustion_sector_capacity(capacity);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_file_pattern(pattern.as_str());
        }
        if self.discovery_only {
            config = config.with_discovery_only();
        }
        if self.no_progress {
            config = config.without_progress();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn get_log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Set up the tracing subscriber on stderr
pub fn init_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reas_processor={}", args.get_log_level())));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Run one ingestion as described by `args`
pub async fn run(args: Args) -> Result<IngestStats> {
    let config = args.to_config().context("Invalid configuration")?;

    let pipeline = IngestionPipeline::new(args.input_dir.clone(), args.output_path.clone())
        .with_context(|| format!("Cannot ingest {}", args.input_dir.display()))?
        .with_config(config);

    let stats = pipeline.run().await.context("Ingestion failed")?;
    Ok(stats)
}
