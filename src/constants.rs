//! Application constants for the REAS processor
//!
//! Axis and array names used in the persisted store, plus the default
//! layout of REAS v2.1 "Country and Regional Tables" files.

// =============================================================================
// Axis Names
// =============================================================================

/// Pollutant codes such as `NH3` or `PM2.5`
pub const POLLUTANT: &str = "pollutant";

/// Inventory year, kept as the four-character token from the file name
pub const YEAR: &str = "year";

/// Region and sub-region codes such as `IND_TAMI`
pub const REGION: &str = "region";

/// Combustion fuels (rows of the combustion table)
pub const FUEL: &str = "fuel";

/// Combustion source sectors (columns of the combustion table)
pub const COMBUSTION_SECTOR: &str = "combustion_sector";

/// Non-combustion source sectors
pub const NON_COMBUSTION_SECTOR: &str = "non_combustion_sector";

// =============================================================================
// Array Names
// =============================================================================

/// Combustion emissions: pollutant x year x region x combustion_sector x fuel
pub const COMBUSTION: &str = "combustion";

/// Non-combustion emissions: pollutant x year x region x non_combustion_sector
pub const NON_COMBUSTION: &str = "non_combustion";

/// File-level grand totals: pollutant x year x region
pub const TOTAL: &str = "total";

/// Value stored wherever no observation was supplied
pub const MISSING: f64 = f64::NAN;

// =============================================================================
// REAS v2.1 File Layout
// =============================================================================

/// File names look like `REASv2.1_NH3_2008_IND_TAMI.txt`
pub mod file_name {
    /// `REASv2.1_`
    pub const PREFIX_WIDTH: usize = 9;
    pub const POLLUTANT_WIDTH: usize = 3;
    /// `PM2.5` and `PM10` codes are two characters wider
    pub const WIDE_POLLUTANT_WIDTH: usize = 5;
    pub const WIDE_POLLUTANT_MARKER: &str = "_PM";
    pub const SEPARATOR_WIDTH: usize = 1;
    pub const YEAR_WIDTH: usize = 4;
    pub const REGION_WIDTH: usize = 8;
}

/// Body layout of a single table file
pub mod body {
    /// Lines before the combustion header row
    pub const HEADER_LINES: usize = 6;
    /// Leading tokens on the combustion header row that are not sector names
    pub const COMBUSTION_HEADER_SKIP: usize = 0;
    pub const SUB_TOTAL_LABEL: &str = "SUB_TOTAL";
    pub const TOTAL_LABEL: &str = "TOTAL";
}

/// Default capacities for the growing dimensions.
///
/// Counts from the REAS v2.1 table description plus slack: one slot for
/// `SUB_TOTAL` and room for sector names that appear in the data files
/// but not in the description (`AGRICULT`, `FISHING`, `FERTPROD`,
/// `GASPROD`, `SMALLINCIN`, `WASTEINCIN`).
pub mod capacity {
    pub const FUEL: usize = 17 + 1;
    pub const COMBUSTION_SECTOR: usize = 28 + 1 + 6;
    pub const NON_COMBUSTION_SECTOR: usize = 71 + 1 + 1;
}

/// Default glob for input tables within the input directory
pub const INPUT_FILE_PATTERN: &str = "*.txt";

/// Emit a progress notification every this many files
pub const PROGRESS_INTERVAL: usize = 10;

// =============================================================================
// Store Layout
// =============================================================================

pub const MANIFEST_FILE: &str = "manifest.json";
pub const LABELS_DIR: &str = "labels";
pub const ARRAYS_DIR: &str = "arrays";
pub const LABEL_COLUMN: &str = "label";
pub const VALUE_COLUMN: &str = "value";
pub const STORE_FORMAT_VERSION: u32 = 1;
