//! Allocation and the loading pass.
//!
//! [`StoreLoader::allocate`] builds the six dimensions and three arrays
//! from a finished [`LabelScan`]. Each file is then parsed into the store:
//! combustion values go to a per-file buffer over (sector, fuel) that is
//! copied into the combustion array in one write, non-combustion values
//! and the grand total are written directly.

use super::discovery::LabelScan;
use crate::array::LabeledArray;
use crate::config::{BodyLayout, ReasConfig};
use crate::constants::{self, MISSING};
use crate::dimension::{DimensionId, DimensionRegistry};
use crate::error::Result;
use crate::key;
use crate::models::{BodyStats, FileKey};
use crate::parser::{Record, RecordSink, parse_body};
use crate::store::Store;

use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Ids of the six dimensions in the store
#[derive(Debug, Clone, Copy)]
struct Axes {
    pollutant: DimensionId,
    year: DimensionId,
    region: DimensionId,
    fuel: DimensionId,
    combustion_sector: DimensionId,
    non_combustion_sector: DimensionId,
}

/// Owner of the store while files are being loaded
#[derive(Debug)]
pub struct StoreLoader {
    registry: DimensionRegistry,
    axes: Axes,
    combustion: LabeledArray,
    non_combustion: LabeledArray,
    total: LabeledArray,
    buffer: LabeledArray,
    layout: BodyLayout,
}

impl StoreLoader {
    /// Create dimensions sized from `scan` and `config`, and allocate the arrays
    pub fn allocate(scan: &LabelScan, config: &ReasConfig) -> Result<Self> {
        let mut registry = DimensionRegistry::new();
        let caps = &config.capacities;

        let axes = Axes {
            pollutant: registry.create_fixed(constants::POLLUTANT, scan.pollutants())?,
            year: registry.create_fixed(constants::YEAR, scan.years())?,
            region: registry.create_fixed(constants::REGION, scan.regions())?,
            fuel: registry.create(constants::FUEL, caps.fuel)?,
            combustion_sector: registry
                .create(constants::COMBUSTION_SECTOR, caps.combustion_sector)?,
            non_combustion_sector: registry
                .create(constants::NON_COMBUSTION_SECTOR, caps.non_combustion_sector)?,
        };

        let fixed = [axes.pollutant, axes.year, axes.region];
        let combustion = LabeledArray::new(
            constants::COMBUSTION,
            [&fixed[..], &[axes.combustion_sector, axes.fuel]].concat(),
            &registry,
        )?;
        let non_combustion = LabeledArray::new(
            constants::NON_COMBUSTION,
            [&fixed[..], &[axes.non_combustion_sector]].concat(),
            &registry,
        )?;
        let total = LabeledArray::new(constants::TOTAL, fixed.to_vec(), &registry)?;
        let buffer = LabeledArray::new(
            "combustion_buffer",
            vec![axes.combustion_sector, axes.fuel],
            &registry,
        )?;

        debug!(
            "Allocated combustion {:?}, non-combustion {:?}, total {:?}",
            combustion.shape(),
            non_combustion.shape(),
            total.shape()
        );

        Ok(Self {
            registry,
            axes,
            combustion,
            non_combustion,
            total,
            buffer,
            layout: config.body.clone(),
        })
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.registry
    }

    /// Read and load one table file
    pub async fn load_file(&mut self, path: &Path, key: &FileKey) -> Result<BodyStats> {
        let text = fs::read_to_string(path).await?;
        self.load_text(path, key, &text)
    }

    /// Load the body `text` of the file at coordinate `key`
    pub fn load_text(&mut self, path: &Path, key: &FileKey, text: &str) -> Result<BodyStats> {
        let coordinate = [
            self.registry.lookup(self.axes.pollutant, &key.pollutant)?,
            self.registry.lookup(self.axes.year, &key.year)?,
            self.registry.lookup(self.axes.region, &key.region)?,
        ];

        self.buffer.fill(MISSING);
        let mut sink = FileSink {
            registry: &mut self.registry,
            axes: self.axes,
            coordinate,
            buffer: &mut self.buffer,
            non_combustion: &mut self.non_combustion,
            total: &mut self.total,
        };
        let stats = parse_body(path, text, &self.layout, &mut sink)?;

        let [p, y, r] = coordinate;
        self.combustion
            .assign(&self.registry, &key![p, y, r, .., ..], &self.buffer.data().view())?;

        debug!(
            "Loaded {} ({}): {} combustion, {} non-combustion, {} skipped",
            path.display(),
            key,
            stats.combustion_records,
            stats.non_combustion_records,
            stats.skipped_lines
        );
        Ok(stats)
    }

    /// Hand over the loaded dimensions and arrays
    pub fn finish(self) -> Result<Store> {
        Store::new(
            self.registry,
            vec![self.combustion, self.non_combustion, self.total],
        )
    }
}

/// Routes one file's records into the store
struct FileSink<'a> {
    registry: &'a mut DimensionRegistry,
    axes: Axes,
    coordinate: [usize; 3],
    buffer: &'a mut LabeledArray,
    non_combustion: &'a mut LabeledArray,
    total: &'a mut LabeledArray,
}

impl RecordSink for FileSink<'_> {
    fn begin_combustion(&mut self, sectors: &[&str]) -> Result<()> {
        for sector in sectors {
            self.registry
                .lookup_or_insert(self.axes.combustion_sector, sector)?;
        }
        Ok(())
    }

    fn record(&mut self, record: Record<'_>) -> Result<()> {
        let [p, y, r] = self.coordinate;
        match record {
            Record::Combustion {
                sector,
                fuel,
                value,
            } => {
                let s = self
                    .registry
                    .lookup_or_insert(self.axes.combustion_sector, sector)?;
                let f = self.registry.lookup_or_insert(self.axes.fuel, fuel)?;
                self.buffer.set(&*self.registry, &key![s, f], value)
            }
            Record::NonCombustion { sector, value } => {
                let s = self
                    .registry
                    .lookup_or_insert(self.axes.non_combustion_sector, sector)?;
                self.non_combustion
                    .set(&*self.registry, &key![p, y, r, s], value)
            }
            Record::Total { value } => self.total.set(&*self.registry, &key![p, y, r], value),
        }
    }
}
