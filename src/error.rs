//! Error handling for REAS ingestion and store operations.
//!
//! Provides error types with context for label resolution, array
//! indexing, input parsing and store persistence failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReasError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Label '{label}' not found in dimension '{dimension}'")]
    NotFound { dimension: String, label: String },

    #[error(
        "Dimension '{dimension}' is full ({capacity} labels), cannot add '{label}'; raise its capacity and rerun"
    )]
    CapacityExceeded {
        dimension: String,
        capacity: usize,
        label: String,
    },

    #[error("Key for array '{array}' has {found} components, expected {expected}")]
    DimensionMismatch {
        array: String,
        expected: usize,
        found: usize,
    },

    #[error("Index {index} out of bounds for dimension '{dimension}' of length {len}")]
    IndexOutOfBounds {
        dimension: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid slice on dimension '{dimension}': {reason}")]
    InvalidSlice { dimension: String, reason: String },

    #[error("Shape mismatch writing to array '{array}': selection {expected:?}, value {found:?}")]
    ShapeMismatch {
        array: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Unknown array: {name}")]
    UnknownArray { name: String },

    #[error("Unknown dimension: {name}")]
    UnknownDimension { name: String },

    #[error("Cannot decompose file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Truncated input file: {path} - {reason}")]
    TruncatedFile { path: PathBuf, reason: String },

    #[error("Invalid store at {path}: {reason}")]
    InvalidStore { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

pub type Result<T> = std::result::Result<T, ReasError>;
