//! Core data structures shared across the pipeline.
//!
//! Defines the per-file coordinate on the fixed axes and the statistics
//! gathered while parsing and loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed-axis coordinate of one input file, decoded from its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileKey {
    pub pollutant: String,
    pub year: String,
    pub region: String,
}

impl FileKey {
    pub fn new(
        pollutant: impl Into<String>,
        year: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            pollutant: pollutant.into(),
            year: year.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for FileKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.pollutant, self.year, self.region)
    }
}

/// Counts from parsing one file body
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BodyStats {
    pub combustion_records: usize,
    pub non_combustion_records: usize,
    pub totals: usize,
    pub subtotals_dropped: usize,
    pub skipped_lines: usize,
}

impl BodyStats {
    /// Fold another file's counts into this one
    pub fn absorb(&mut self, other: &BodyStats) {
        self.combustion_records += other.combustion_records;
        self.non_combustion_records += other.non_combustion_records;
        self.totals += other.totals;
        self.subtotals_dropped += other.subtotals_dropped;
        self.skipped_lines += other.skipped_lines;
    }
}

/// Ingestion statistics for one run
#[derive(Debug, Default)]
pub struct IngestStats {
    pub files_discovered: usize,
    pub files_skipped: usize,
    pub files_loaded: usize,
    pub records: BodyStats,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
