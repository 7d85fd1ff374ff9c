//! REAS Processor Library
//!
//! A Rust library for loading REAS (Regional Emission inventory in ASia)
//! country and regional tables into a label-addressable multidimensional
//! store.
//!
//! This library provides tools for:
//! - Decoding pollutant, year and region from fixed-width file names
//! - Parsing table bodies into combustion and non-combustion records
//! - Growing label dimensions with explicit capacities
//! - Labeled N-d arrays with mixed index, label, point-list and slice keys
//! - Persisting the store as Parquet tables plus a JSON manifest

pub mod array;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dimension;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod store;

// Re-export commonly used types
pub use array::{AxisSlice, Key, LabeledArray, Point};
pub use config::ReasConfig;
pub use dimension::{Dimension, DimensionId, DimensionKind, DimensionRegistry};
pub use error::{ReasError, Result};
pub use models::{BodyStats, FileKey, IngestStats};
pub use pipeline::{IngestionPipeline, PipelineState};
pub use store::Store;
