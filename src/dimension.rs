//! Dimension registry: named, append-only label sets with stable indices.
//!
//! Every axis of every array in a [`Store`](crate::store::Store) is bound to
//! a [`Dimension`] owned by a [`DimensionRegistry`]. Arrays hold a
//! [`DimensionId`] rather than a copy, so a label interned once is visible
//! to all arrays sharing that axis.
//!
//! Indices are assigned in first-seen order and never change. A dimension
//! never holds more labels than its declared capacity; growth past it is
//! reported as [`ReasError::CapacityExceeded`] instead of reallocating.
//!
//! `lookup_or_insert` is a check-then-act sequence and takes `&mut self`,
//! so mutation is serialized by ownership.

use crate::error::{ReasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Lifecycle of a dimension's label set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// Label set fully known up front; capacity equals its length
    Fixed,
    /// Labels discovered while loading, up to a declared capacity
    Growing,
}

/// Handle to a dimension inside a [`DimensionRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionId(usize);

/// Ordered set of unique labels for one named axis
#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    kind: DimensionKind,
    capacity: usize,
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Dimension {
    /// Create an empty dimension with room for `capacity` labels
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            kind: DimensionKind::Growing,
            capacity,
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a full dimension from a known label set, in the given order.
    ///
    /// Duplicate labels keep their first position.
    pub fn fixed<I, S>(name: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels_vec = Vec::new();
        let mut index = HashMap::new();
        for label in labels {
            let label = label.into();
            if !index.contains_key(&label) {
                index.insert(label.clone(), labels_vec.len());
                labels_vec.push(label);
            }
        }
        Self {
            name: name.into(),
            kind: DimensionKind::Fixed,
            capacity: labels_vec.len(),
            labels: labels_vec,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of labels assigned so far
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Assigned labels in index order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label at `index`, if assigned
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// Index of `label`; exact, case- and whitespace-sensitive match
    pub fn lookup(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| ReasError::NotFound {
                dimension: self.name.clone(),
                label: label.to_string(),
            })
    }

    /// Index of `label`, appending it at the next free slot if absent
    pub fn lookup_or_insert(&mut self, label: &str) -> Result<usize> {
        if let Some(&index) = self.index.get(label) {
            return Ok(index);
        }

        if self.labels.len() >= self.capacity {
            return Err(ReasError::CapacityExceeded {
                dimension: self.name.clone(),
                capacity: self.capacity,
                label: label.to_string(),
            });
        }

        let index = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), index);
        debug!("Added {} to `{}` in index {}", label, self.name, index);
        Ok(index)
    }
}

/// Owner of every dimension used by a store
#[derive(Debug, Clone, Default)]
pub struct DimensionRegistry {
    dimensions: Vec<Dimension>,
    by_name: HashMap<String, DimensionId>,
}

impl DimensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty growing dimension
    pub fn create(&mut self, name: &str, capacity: usize) -> Result<DimensionId> {
        self.register(Dimension::new(name, capacity))
    }

    /// Create a fixed dimension holding exactly `labels`
    pub fn create_fixed<I, S>(&mut self, name: &str, labels: I) -> Result<DimensionId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(Dimension::fixed(name, labels))
    }

    /// Take ownership of a dimension built elsewhere
    pub fn register(&mut self, dimension: Dimension) -> Result<DimensionId> {
        if self.by_name.contains_key(dimension.name()) {
            return Err(ReasError::Configuration {
                message: format!("dimension '{}' is already registered", dimension.name()),
            });
        }
        let id = DimensionId(self.dimensions.len());
        self.by_name.insert(dimension.name().to_string(), id);
        self.dimensions.push(dimension);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Result<DimensionId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ReasError::UnknownDimension {
                name: name.to_string(),
            })
    }

    /// Dimension behind `id`; ids from another registry may not resolve
    pub fn get(&self, id: DimensionId) -> Result<&Dimension> {
        self.dimensions.get(id.0).ok_or_else(|| unknown_id(id))
    }

    pub fn by_name(&self, name: &str) -> Result<&Dimension> {
        self.get(self.id(name)?)
    }

    pub fn lookup(&self, id: DimensionId, label: &str) -> Result<usize> {
        self.get(id)?.lookup(label)
    }

    pub fn lookup_or_insert(&mut self, id: DimensionId, label: &str) -> Result<usize> {
        self.dimensions
            .get_mut(id.0)
            .ok_or_else(|| unknown_id(id))?
            .lookup_or_insert(label)
    }

    /// All dimensions in registration order
    pub fn iter(&self) -> impl Iterator<Item = (DimensionId, &Dimension)> {
        self.dimensions
            .iter()
            .enumerate()
            .map(|(i, dim)| (DimensionId(i), dim))
    }
}

fn unknown_id(id: DimensionId) -> ReasError {
    ReasError::UnknownDimension {
        name: format!("#{}", id.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let mut dim = Dimension::new("fuel", 4);
        assert_eq!(dim.lookup_or_insert("COAL").unwrap(), 0);
        assert_eq!(dim.lookup_or_insert("OIL").unwrap(), 1);
        assert_eq!(dim.lookup_or_insert("GAS").unwrap(), 2);
        assert_eq!(dim.labels(), &["COAL", "OIL", "GAS"]);
    }

    #[test]
    fn test_lookup_is_idempotent_after_insert() {
        let mut dim = Dimension::new("combustion_sector", 8);
        let labels = ["POWER", "IND", "DOM", "TRA", "IND", "POWER"];
        let assigned: Vec<usize> = labels
            .iter()
            .map(|l| dim.lookup_or_insert(l).unwrap())
            .collect();

        for (label, index) in labels.iter().zip(assigned) {
            assert_eq!(dim.lookup(label).unwrap(), index);
        }
    }

    #[test]
    fn test_reinsert_does_not_grow() {
        let mut dim = Dimension::new("fuel", 2);
        dim.lookup_or_insert("COAL").unwrap();
        assert_eq!(dim.len(), 1);
        assert_eq!(dim.lookup_or_insert("COAL").unwrap(), 0);
        assert_eq!(dim.len(), 1);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut dim = Dimension::new("fuel", 2);
        dim.lookup_or_insert("COAL").unwrap();
        dim.lookup_or_insert("OIL").unwrap();

        // Existing labels still resolve at capacity
        assert_eq!(dim.lookup_or_insert("OIL").unwrap(), 1);

        match dim.lookup_or_insert("GAS").unwrap_err() {
            ReasError::CapacityExceeded {
                dimension,
                capacity,
                label,
            } => {
                assert_eq!(dimension, "fuel");
                assert_eq!(capacity, 2);
                assert_eq!(label, "GAS");
            }
            other => panic!("Expected CapacityExceeded, got {:?}", other),
        }
        assert_eq!(dim.len(), 2);
    }

    #[test]
    fn test_lookup_not_found_is_exact() {
        let mut dim = Dimension::new("region", 3);
        dim.lookup_or_insert("IND_TAMI").unwrap();

        assert!(matches!(
            dim.lookup("ind_tami"),
            Err(ReasError::NotFound { .. })
        ));
        assert!(matches!(
            dim.lookup(" IND_TAMI"),
            Err(ReasError::NotFound { .. })
        ));
    }

    #[test]
    fn test_fixed_dimension_is_full() {
        let mut dim = Dimension::fixed("year", ["2000", "2005", "2008"]);
        assert_eq!(dim.kind(), DimensionKind::Fixed);
        assert_eq!(dim.capacity(), 3);
        assert_eq!(dim.lookup("2005").unwrap(), 1);
        assert!(matches!(
            dim.lookup_or_insert("2010"),
            Err(ReasError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_registry_shares_dimensions_by_id() {
        let mut registry = DimensionRegistry::new();
        let fuel = registry.create("fuel", 3).unwrap();
        let year = registry.create_fixed("year", ["2008"]).unwrap();

        registry.lookup_or_insert(fuel, "COAL").unwrap();
        assert_eq!(registry.id("fuel").unwrap(), fuel);
        assert_eq!(registry.by_name("fuel").unwrap().len(), 1);
        assert_eq!(registry.lookup(year, "2008").unwrap(), 0);

        assert!(registry.create("fuel", 5).is_err());
        assert!(matches!(
            registry.id("sector"),
            Err(ReasError::UnknownDimension { .. })
        ));
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut dim = Dimension::new("fuel", usize::MAX);
        assert_eq!(dim.lookup_or_insert("COAL").unwrap(), 0);
        assert_eq!(dim.capacity(), usize::MAX);
    }

    #[test]
    fn test_foreign_id_is_an_error() {
        let mut other = DimensionRegistry::new();
        other.create("fuel", 2).unwrap();
        let foreign = other.create("sector", 2).unwrap();

        let mut registry = DimensionRegistry::new();
        registry.create("fuel", 2).unwrap();

        assert!(matches!(
            registry.get(foreign),
            Err(ReasError::UnknownDimension { .. })
        ));
        assert!(matches!(
            registry.lookup(foreign, "COAL"),
            Err(ReasError::UnknownDimension { .. })
        ));
        assert!(matches!(
            registry.lookup_or_insert(foreign, "COAL"),
            Err(ReasError::UnknownDimension { .. })
        ));
    }
}
