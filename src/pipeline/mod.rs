//! Ingestion pipeline for a directory of REAS tables.
//!
//! Runs in two passes over the input files. The scanning pass decodes file
//! names to collect the fixed pollutant, year and region labels; the
//! store is then allocated and the loading pass parses every file body into
//! it. The finished store is persisted to the output directory.

pub mod discovery;
pub mod loader;
pub mod progress;

#[cfg(test)]
pub mod tests;

use self::discovery::{FileDiscovery, LabelScan};
use self::loader::StoreLoader;
use self::progress::{BarProgress, LogProgress, ProgressObserver};

use crate::config::ReasConfig;
use crate::error::{ReasError, Result};
use crate::models::{BodyStats, IngestStats};
use crate::store::Store;

use colored::*;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tokio::{fs, task};
use tracing::info;

/// Phase of an ingestion run; phases only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Scanning,
    Allocating,
    Loading,
    Closed,
}

impl PipelineState {
    fn next(self) -> Option<Self> {
        match self {
            Self::Scanning => Some(Self::Allocating),
            Self::Allocating => Some(Self::Loading),
            Self::Loading => Some(Self::Closed),
            Self::Closed => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scanning => "scanning",
            Self::Allocating => "allocating",
            Self::Loading => "loading",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Builds a store from one input directory
#[derive(Debug)]
pub struct IngestionPipeline {
    input_dir: PathBuf,
    output_path: PathBuf,
    config: ReasConfig,
    state: PipelineState,
}

impl IngestionPipeline {
    /// Create a pipeline; the store goes to `input_dir/reas` unless `output_path` is given
    pub fn new(input_dir: PathBuf, output_path: Option<PathBuf>) -> Result<Self> {
        if !input_dir.is_dir() {
            return Err(ReasError::InputNotFound { path: input_dir });
        }
        let output_path = output_path.unwrap_or_else(|| input_dir.join("reas"));

        Ok(Self {
            input_dir,
            output_path,
            config: ReasConfig::default(),
            state: PipelineState::Scanning,
        })
    }

    /// Configure the pipeline
    pub fn with_config(mut self, config: ReasConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn output_path(&self) -> &PathBuf {
        &self.output_path
    }

    fn advance(&mut self, to: PipelineState) -> Result<()> {
        if to != PipelineState::Closed && self.state.next() != Some(to) {
            return Err(ReasError::Configuration {
                message: format!("pipeline cannot move from {} to {}", self.state, to),
            });
        }
        info!("Pipeline {} -> {}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Scanning pass: list input files and collect the fixed-axis labels
    pub async fn scan(&self) -> Result<LabelScan> {
        if self.state != PipelineState::Scanning {
            return Err(ReasError::Configuration {
                message: format!("cannot scan a pipeline in state {}", self.state),
            });
        }
        let discovery = FileDiscovery::new(self.input_dir.clone(), &self.config.file_pattern)?;
        let files = discovery.discover_files().await?;
        Ok(LabelScan::scan(&files, &self.config.file_name))
    }

    /// Allocate the store and run the loading pass over every scanned file
    pub async fn load(
        &mut self,
        scan: &LabelScan,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(Store, BodyStats)> {
        self.advance(PipelineState::Allocating)?;
        let mut loader = StoreLoader::allocate(scan, &self.config)?;

        self.advance(PipelineState::Loading)?;
        let files = scan.files();
        let mut records = BodyStats::default();
        observer.started(files.len());
        for (done, (path, key)) in files.iter().enumerate() {
            let stats = loader.load_file(path, key).await?;
            records.absorb(&stats);
            observer.file_loaded(done + 1, files.len(), path);
        }
        observer.finished();

        Ok((loader.finish()?, records))
    }

    /// Run both passes and persist the store, consuming the pipeline
    pub async fn run(mut self) -> Result<IngestStats> {
        let start_time = Instant::now();
        println!("{}", "Starting REAS ingestion".bright_green().bold());
        println!("  {} {}", "Input:".bright_cyan(), self.input_dir.display());
        println!("  {} {}", "Output:".bright_cyan(), self.output_path.display());

        println!("\n{}", "Scanning file names...".bright_yellow());
        let scan = self.scan().await?;
        let mut stats = IngestStats {
            files_discovered: scan.files().len() + scan.skipped().len(),
            files_skipped: scan.skipped().len(),
            output_path: self.output_path.clone(),
            ..Default::default()
        };
        println!(
            "  {} {} files: {} pollutants, {} years, {} regions",
            "Found".bright_green(),
            scan.files().len().to_string().bright_white().bold(),
            scan.pollutants().count().to_string().bright_white(),
            scan.years().count().to_string().bright_white(),
            scan.regions().count().to_string().bright_white()
        );
        if stats.files_skipped > 0 {
            println!(
                "  {} {} files with unrecognised names",
                "Skipped".bright_red(),
                stats.files_skipped.to_string().bright_red().bold()
            );
        }

        if self.config.discovery_only {
            println!("\n{}", "Discovery mode - scan complete".bright_green());
            report_labels(&scan);
            self.advance(PipelineState::Closed)?;
            stats.processing_time_ms = start_time.elapsed().as_millis();
            return Ok(stats);
        }

        println!("\n{}", "Loading tables...".bright_yellow());
        let (store, records) = if self.config.show_progress {
            let mut observer = BarProgress::new(self.config.progress_interval);
            self.load(&scan, &mut observer).await?
        } else {
            let mut observer = LogProgress::new(self.config.progress_interval);
            self.load(&scan, &mut observer).await?
        };
        stats.files_loaded = scan.files().len();
        stats.records = records;

        println!("\n{}", "Persisting store...".bright_yellow());
        fs::create_dir_all(&self.output_path).await?;
        let output_path = self.output_path.clone();
        task::spawn_blocking(move || store.persist(&output_path))
            .await
            .map_err(|e| ReasError::Interrupted {
                reason: format!("persist task failed: {}", e),
            })??;
        self.advance(PipelineState::Closed)?;

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_summary(&stats);
        Ok(stats)
    }
}

fn report_labels(scan: &LabelScan) {
    let rows = [
        ("Pollutants:", scan.pollutants().collect::<Vec<_>>()),
        ("Years:", scan.years().collect::<Vec<_>>()),
        ("Regions:", scan.regions().collect::<Vec<_>>()),
    ];
    for (title, labels) in rows {
        println!("  {} {}", title.bright_cyan(), labels.join(", "));
    }
}

fn print_summary(stats: &IngestStats) {
    println!("\n{}", "Ingestion Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Files loaded:".bright_cyan(),
        stats.files_loaded.to_string().bright_white()
    );
    println!(
        "  {} {} combustion, {} non-combustion, {} totals",
        "Records:".bright_cyan(),
        stats.records.combustion_records.to_string().bright_white().bold(),
        stats.records.non_combustion_records.to_string().bright_white().bold(),
        stats.records.totals.to_string().bright_white().bold()
    );
    if stats.records.skipped_lines > 0 {
        println!(
            "  {} {}",
            "Lines skipped:".bright_red(),
            stats.records.skipped_lines.to_string().bright_red().bold()
        );
    }
}
