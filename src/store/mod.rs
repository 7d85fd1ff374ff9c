//! Label-addressable dataset store.
//!
//! A [`Store`] owns a [`DimensionRegistry`] and the arrays indexed by its
//! dimensions. It is produced by the ingestion pipeline, persisted with
//! [`Store::persist`] and reopened with [`Store::open`].
//!
//! Persisted layout:
//!
//! ```text
//! store/
//!   manifest.json              dimensions, arrays and their axis names
//!   labels/<dimension>.parquet one `label` column, index order
//!   arrays/<array>.parquet     one UInt32 column per axis + `value`
//! ```

pub mod manifest;
pub mod reader;
pub mod writer;

use crate::array::{Key, LabeledArray};
use crate::dimension::DimensionRegistry;
use crate::error::{ReasError, Result};
use ndarray::ArrayD;
use std::path::Path;

pub use manifest::{ArrayEntry, DimensionEntry, Manifest};

/// Dimensions plus the named arrays that share them
#[derive(Debug, Clone)]
pub struct Store {
    registry: DimensionRegistry,
    arrays: Vec<LabeledArray>,
}

impl Store {
    /// Assemble a store; every array must have a unique name
    pub fn new(registry: DimensionRegistry, arrays: Vec<LabeledArray>) -> Result<Self> {
        for (i, array) in arrays.iter().enumerate() {
            if arrays[..i].iter().any(|a| a.name() == array.name()) {
                return Err(ReasError::Configuration {
                    message: format!("array '{}' is defined twice", array.name()),
                });
            }
        }
        Ok(Self { registry, arrays })
    }

    /// Read a persisted store
    pub fn open(dir: &Path) -> Result<Self> {
        reader::read_store(dir)
    }

    /// Write this store under `dir`, replacing a previous store there
    pub fn persist(&self, dir: &Path) -> Result<Manifest> {
        writer::write_store(self, dir)
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.registry
    }

    pub fn arrays(&self) -> &[LabeledArray] {
        &self.arrays
    }

    pub fn array(&self, name: &str) -> Result<&LabeledArray> {
        self.arrays
            .iter()
            .find(|a| a.name() == name)
            .ok_or_else(|| ReasError::UnknownArray {
                name: name.to_string(),
            })
    }

    /// Labels of a dimension, in index order
    pub fn labels(&self, dimension: &str) -> Result<&[String]> {
        Ok(self.registry.by_name(dimension)?.labels())
    }

    /// Names of the dimensions an array is indexed by, in axis order
    pub fn axis_names(&self, array: &str) -> Result<Vec<&str>> {
        let array = self.array(array)?;
        array
            .axes()
            .iter()
            .map(|&id| self.registry.get(id).map(|dim| dim.name()))
            .collect()
    }

    pub fn get(&self, array: &str, key: &[Key<'_>]) -> Result<ArrayD<f64>> {
        self.array(array)?.get(&self.registry, key)
    }

    pub fn get_value(&self, array: &str, key: &[Key<'_>]) -> Result<f64> {
        self.array(array)?.get_value(&self.registry, key)
    }
}
