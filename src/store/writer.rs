//! Store persistence.
//!
//! Writes each dimension as a one-column Parquet label table and each data
//! array as a dense long-format Parquet table (one coordinate column per
//! axis, named after the axis, plus `value`), then a JSON manifest tying
//! them together. Growing axes are written at their used length, not their
//! capacity.

use super::manifest::{ArrayEntry, DimensionEntry, Manifest};
use super::Store;
use crate::constants::{
    ARRAYS_DIR, LABEL_COLUMN, LABELS_DIR, MANIFEST_FILE, STORE_FORMAT_VERSION, VALUE_COLUMN,
};
use crate::error::{ReasError, Result};

use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Write `store` under `dir`, returning the manifest written
pub fn write_store(store: &Store, dir: &Path) -> Result<Manifest> {
    // a failed rewrite must not leave the old manifest over new tables
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        fs::remove_file(&manifest_path)?;
    }
    for sub in [LABELS_DIR, ARRAYS_DIR] {
        let path = dir.join(sub);
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
    }

    let registry = store.registry();
    let mut dimensions = Vec::new();
    for (_, dim) in registry.iter() {
        let file = format!("{}/{}.parquet", LABELS_DIR, dim.name());
        let mut df = DataFrame::new(vec![Column::new(LABEL_COLUMN.into(), dim.labels())])?;
        write_parquet(&mut df, &dir.join(&file))?;
        debug!("Wrote {} labels for `{}`", dim.len(), dim.name());

        dimensions.push(DimensionEntry {
            name: dim.name().to_string(),
            kind: dim.kind(),
            capacity: dim.capacity(),
            len: dim.len(),
            file,
        });
    }

    let mut arrays = Vec::new();
    for array in store.arrays() {
        let axes = array
            .axes()
            .iter()
            .map(|&id| registry.get(id).map(|dim| dim.name().to_string()))
            .collect::<Result<Vec<String>>>()?;
        let data = array.compacted(registry)?;
        let shape = data.shape().to_vec();

        let mut coordinates: Vec<Vec<u32>> = vec![Vec::with_capacity(data.len()); axes.len()];
        let mut values = Vec::with_capacity(data.len());
        for (index, &value) in data.indexed_iter() {
            for (axis, column) in coordinates.iter_mut().enumerate() {
                let coordinate = u32::try_from(index[axis]).map_err(|_| ReasError::InvalidStore {
                    path: dir.to_path_buf(),
                    reason: format!("axis '{}' is too long for UInt32 coordinates", axes[axis]),
                })?;
                column.push(coordinate);
            }
            values.push(value);
        }

        let mut columns: Vec<Column> = axes
            .iter()
            .zip(coordinates)
            .map(|(name, coords)| Column::new(name.as_str().into(), coords))
            .collect();
        columns.push(Column::new(VALUE_COLUMN.into(), values));
        let mut df = DataFrame::new(columns)?;

        let file = format!("{}/{}.parquet", ARRAYS_DIR, array.name());
        write_parquet(&mut df, &dir.join(&file))?;
        debug!(
            "Wrote array `{}` with shape {:?} ({} cells)",
            array.name(),
            shape,
            df.height()
        );

        arrays.push(ArrayEntry {
            name: array.name().to_string(),
            axes,
            shape,
            file,
        });
    }

    let manifest = Manifest {
        format_version: STORE_FORMAT_VERSION,
        created_at: chrono::Utc::now(),
        sentinel: "NaN".to_string(),
        dimensions,
        arrays,
    };
    let manifest_file = File::create(&manifest_path)?;
    serde_json::to_writer_pretty(manifest_file, &manifest)?;

    info!(
        "Persisted store with {} dimensions and {} arrays to {}",
        manifest.dimensions.len(),
        manifest.arrays.len(),
        dir.display()
    );
    Ok(manifest)
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)?;
    Ok(())
}
