//! On-disk description of a persisted store.

use crate::dimension::DimensionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of `manifest.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Textual form of the missing-value marker in data arrays
    pub sentinel: String,
    pub dimensions: Vec<DimensionEntry>,
    pub arrays: Vec<ArrayEntry>,
}

/// One label array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionEntry {
    pub name: String,
    pub kind: DimensionKind,
    /// Declared capacity while loading
    pub capacity: usize,
    /// Labels actually assigned (rows in `file`)
    pub len: usize,
    /// Parquet file relative to the store root
    pub file: String,
}

/// One data array, tagged with the axes it is indexed by
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayEntry {
    pub name: String,
    /// Dimension names in axis order; also the coordinate column names
    pub axes: Vec<String>,
    pub shape: Vec<usize>,
    /// Parquet file relative to the store root
    pub file: String,
}
