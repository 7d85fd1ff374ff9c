//! Reopening a persisted store.

use super::manifest::Manifest;
use super::Store;
use crate::array::LabeledArray;
use crate::constants::{LABEL_COLUMN, MANIFEST_FILE, MISSING, STORE_FORMAT_VERSION, VALUE_COLUMN};
use crate::dimension::{Dimension, DimensionKind, DimensionRegistry};
use crate::error::{ReasError, Result};

use ndarray::{ArrayD, IxDyn};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Load the store described by `dir/manifest.json`
pub fn read_store(dir: &Path) -> Result<Store> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(ReasError::InputNotFound {
            path: manifest_path,
        });
    }
    let manifest: Manifest = serde_json::from_reader(File::open(&manifest_path)?)?;

    let invalid = |reason: String| ReasError::InvalidStore {
        path: dir.to_path_buf(),
        reason,
    };

    if manifest.format_version != STORE_FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format version {}",
            manifest.format_version
        )));
    }

    let mut registry = DimensionRegistry::new();
    for entry in &manifest.dimensions {
        let df = read_parquet(&dir.join(&entry.file))?;
        let column = df.column(LABEL_COLUMN)?.as_materialized_series().str()?;
        let labels = column
            .into_iter()
            .map(|label| {
                label
                    .map(str::to_string)
                    .ok_or_else(|| invalid(format!("null label in '{}'", entry.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        if labels.len() != entry.len {
            return Err(invalid(format!(
                "dimension '{}' has {} labels, manifest says {}",
                entry.name,
                labels.len(),
                entry.len
            )));
        }

        let dimension = match entry.kind {
            DimensionKind::Fixed => Dimension::fixed(entry.name.as_str(), labels),
            DimensionKind::Growing => {
                let mut dimension = Dimension::new(entry.name.as_str(), entry.capacity);
                for label in &labels {
                    dimension.lookup_or_insert(label)?;
                }
                dimension
            }
        };
        debug!("Loaded {} labels for `{}`", dimension.len(), entry.name);
        registry.register(dimension)?;
    }

    let mut arrays = Vec::with_capacity(manifest.arrays.len());
    for entry in &manifest.arrays {
        let axes = entry
            .axes
            .iter()
            .map(|name| registry.id(name))
            .collect::<Result<Vec<_>>>()?;

        for (axis, (&id, &len)) in axes.iter().zip(&entry.shape).enumerate() {
            let found = registry.get(id)?.len();
            if found != len {
                return Err(invalid(format!(
                    "array '{}' axis {} has length {}, dimension '{}' has {} labels",
                    entry.name, axis, len, entry.axes[axis], found
                )));
            }
        }

        let df = read_parquet(&dir.join(&entry.file))?;
        let coordinates = entry
            .axes
            .iter()
            .map(|name| -> Result<UInt32Chunked> {
                Ok(df.column(name)?.as_materialized_series().u32()?.clone())
            })
            .collect::<Result<Vec<_>>>()?;
        let values = df.column(VALUE_COLUMN)?.as_materialized_series().f64()?;

        let mut data = ArrayD::from_elem(IxDyn(&entry.shape), MISSING);
        let mut position = vec![0usize; entry.shape.len()];
        for row in 0..df.height() {
            for (axis, column) in coordinates.iter().enumerate() {
                let coordinate = column
                    .get(row)
                    .ok_or_else(|| invalid(format!("null coordinate in '{}'", entry.name)))?
                    as usize;
                if coordinate >= entry.shape[axis] {
                    return Err(invalid(format!(
                        "coordinate {} out of range on axis '{}' of '{}'",
                        coordinate, entry.axes[axis], entry.name
                    )));
                }
                position[axis] = coordinate;
            }
            data[IxDyn(&position)] = values.get(row).unwrap_or(MISSING);
        }

        debug!("Loaded array `{}` with shape {:?}", entry.name, entry.shape);
        arrays.push(LabeledArray::from_data(entry.name.as_str(), axes, data)?);
    }

    Store::new(registry, arrays)
}

fn read_parquet(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ReasError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path)?;
    Ok(ParquetReader::new(file).finish()?)
}
