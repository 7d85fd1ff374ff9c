//! Configuration management and validation.
//!
//! Provides configuration structures for the input file layout, the
//! capacities of the growing dimensions, and run-level settings.

use crate::constants::{self, body, capacity, file_name};
use crate::error::{ReasError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Fixed-width layout of input file names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNameLayout {
    /// Width of the ignored prefix (`REASv2.1_`)
    pub prefix_width: usize,

    /// Width of an ordinary pollutant code
    pub pollutant_width: usize,

    /// Width of pollutant codes selected by `wide_pollutant_marker`
    pub wide_pollutant_width: usize,

    /// Substring of the file name that selects the wide pollutant width
    pub wide_pollutant_marker: String,

    /// Width of each separator between segments
    pub separator_width: usize,

    pub year_width: usize,

    pub region_width: usize,
}

impl Default for FileNameLayout {
    fn default() -> Self {
        Self {
            prefix_width: file_name::PREFIX_WIDTH,
            pollutant_width: file_name::POLLUTANT_WIDTH,
            wide_pollutant_width: file_name::WIDE_POLLUTANT_WIDTH,
            wide_pollutant_marker: file_name::WIDE_POLLUTANT_MARKER.to_string(),
            separator_width: file_name::SEPARATOR_WIDTH,
            year_width: file_name::YEAR_WIDTH,
            region_width: file_name::REGION_WIDTH,
        }
    }
}

/// Layout of a table file body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyLayout {
    /// Lines discarded before the combustion header row
    pub header_lines: usize,

    /// Leading tokens of the combustion header row that are not sector names
    pub combustion_header_skip: usize,

    /// Non-combustion pseudo-sector holding partial subtotals (dropped)
    pub sub_total_label: String,

    /// Non-combustion pseudo-sector holding the file grand total
    pub total_label: String,
}

impl Default for BodyLayout {
    fn default() -> Self {
        Self {
            header_lines: body::HEADER_LINES,
            combustion_header_skip: body::COMBUSTION_HEADER_SKIP,
            sub_total_label: body::SUB_TOTAL_LABEL.to_string(),
            total_label: body::TOTAL_LABEL.to_string(),
        }
    }
}

/// Declared capacities of the dimensions that grow while loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCapacities {
    pub fuel: usize,
    pub combustion_sector: usize,
    pub non_combustion_sector: usize,
}

impl Default for DimensionCapacities {
    fn default() -> Self {
        Self {
            fuel: capacity::FUEL,
            combustion_sector: capacity::COMBUSTION_SECTOR,
            non_combustion_sector: capacity::NON_COMBUSTION_SECTOR,
        }
    }
}

/// Global configuration for REAS ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasConfig {
    pub file_name: FileNameLayout,

    pub body: BodyLayout,

    pub capacities: DimensionCapacities,

    /// Glob matched against file names in the input directory
    pub file_pattern: String,

    /// Files between progress notifications
    pub progress_interval: usize,

    /// Draw a progress bar while loading
    pub show_progress: bool,

    /// Discovery only mode (report label sets and exit without loading)
    pub discovery_only: bool,
}

impl Default for ReasConfig {
    fn default() -> Self {
        Self {
            file_name: FileNameLayout::default(),
            body: BodyLayout::default(),
            capacities: DimensionCapacities::default(),
            file_pattern: constants::INPUT_FILE_PATTERN.to_string(),
            progress_interval: constants::PROGRESS_INTERVAL,
            show_progress: true,
            discovery_only: false,
        }
    }
}

impl ReasConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReasError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        let config: ReasConfig = serde_json::from_str(&text)?;
        debug!("Loaded configuration from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Reject layouts and capacities that cannot describe any input
    pub fn validate(&self) -> Result<()> {
        let layout = &self.file_name;
        let widths = [
            ("pollutant_width", layout.pollutant_width),
            ("wide_pollutant_width", layout.wide_pollutant_width),
            ("year_width", layout.year_width),
            ("region_width", layout.region_width),
        ];
        for (name, width) in widths {
            if width == 0 {
                return Err(ReasError::Configuration {
                    message: format!("file_name.{} must be greater than zero", name),
                });
            }
        }

        let caps = [
            ("fuel", self.capacities.fuel),
            ("combustion_sector", self.capacities.combustion_sector),
            ("non_combustion_sector", self.capacities.non_combustion_sector),
        ];
        for (name, cap) in caps {
            if cap == 0 {
                return Err(ReasError::Configuration {
                    message: format!("capacities.{} must be greater than zero", name),
                });
            }
        }

        if self.progress_interval == 0 {
            return Err(ReasError::Configuration {
                message: "progress_interval must be greater than zero".to_string(),
            });
        }

        if glob::Pattern::new(&self.file_pattern).is_err() {
            return Err(ReasError::Configuration {
                message: format!("file_pattern '{}' is not a valid glob", self.file_pattern),
            });
        }

        Ok(())
    }

    /// Set the fuel dimension capacity
    pub fn with_fuel_capacity(mut self, capacity: usize) -> Self {
        self.capacities.fuel = capacity;
        self
    }

    /// Set the combustion sector dimension capacity
    pub fn with_combustion_sector_capacity(mut self, capacity: usize) -> Self {
        self.capacities.combustion_sector = capacity;
        self
    }

    /// Set the non-combustion sector dimension capacity
    pub fn with_non_combustion_sector_capacity(mut self, capacity: usize) -> Self {
        self.capacities.non_combustion_sector = capacity;
        self
    }

    /// Set the input file glob
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Disable the progress bar (logging notifications remain)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Enable discovery only mode
    pub fn with_discovery_only(mut self) -> Self {
        self.discovery_only = true;
        self
    }
}
