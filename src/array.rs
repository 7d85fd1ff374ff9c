//! Labeled multidimensional arrays.
//!
//! A [`LabeledArray`] is a dense `f64` array whose axes are bound to
//! dimensions in a [`DimensionRegistry`]. Keys mix four kinds of per-axis
//! component:
//!
//! - an integer, used directly as a storage index
//! - a label, resolved through the axis's dimension
//! - a point list of labels and/or integers (multi-point selection)
//! - a slice, passed through unchanged
//!
//! Each component is resolved on its own into an [`AxisIndex`] and the
//! results are composed into one selection. Neither `get` nor `set`
//! interns labels; callers grow dimensions through
//! [`DimensionRegistry::lookup_or_insert`] first.
//!
//! ```
//! use reas_processor::array::LabeledArray;
//! use reas_processor::dimension::DimensionRegistry;
//! use reas_processor::key;
//!
//! let mut registry = DimensionRegistry::new();
//! let region = registry.create_fixed("region", ["BEJ", "ANH", "CHQ"]).unwrap();
//! let fuel = registry.create_fixed("fuel", ["COAL", "OIL"]).unwrap();
//! let mut array = LabeledArray::new("emissions", vec![region, fuel], &registry).unwrap();
//!
//! array.set(&registry, &key!["ANH", "OIL"], 4.0).unwrap();
//! assert_eq!(array.get_value(&registry, &key!["ANH", 1]).unwrap(), 4.0);
//! assert_eq!(array.get(&registry, &key![.., "OIL"]).unwrap().len(), 3);
//! ```

use crate::constants::MISSING;
use crate::dimension::{Dimension, DimensionId, DimensionRegistry};
use crate::error::{ReasError, Result};
use ndarray::{
    ArrayD, ArrayViewD, ArrayViewMutD, Axis, CowArray, IxDyn, SliceInfo, SliceInfoElem,
};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// Build a key from per-axis components: `key!["NH3", 2, .., 0..4]`
#[macro_export]
macro_rules! key {
    ($($component:expr),* $(,)?) => {
        [$($crate::array::Key::from($component)),*]
    };
}

/// Half-open strided range along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSlice {
    pub start: usize,
    /// `None` runs to the end of the axis
    pub end: Option<usize>,
    pub step: usize,
}

impl AxisSlice {
    pub fn new(start: usize, end: Option<usize>, step: usize) -> Self {
        Self { start, end, step }
    }

    /// The whole axis
    pub fn full() -> Self {
        Self::new(0, None, 1)
    }

    /// Number of positions selected on an axis of length `len`
    fn selected_len(&self, len: usize) -> usize {
        let end = self.end.unwrap_or(len);
        if end <= self.start {
            0
        } else {
            (end - self.start).div_ceil(self.step)
        }
    }

    fn to_elem(self) -> SliceInfoElem {
        SliceInfoElem::Slice {
            start: self.start as isize,
            end: self.end.map(|e| e as isize),
            step: self.step as isize,
        }
    }
}

impl From<RangeFull> for AxisSlice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl From<Range<usize>> for AxisSlice {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, Some(range.end), 1)
    }
}

impl From<RangeFrom<usize>> for AxisSlice {
    fn from(range: RangeFrom<usize>) -> Self {
        Self::new(range.start, None, 1)
    }
}

impl From<RangeTo<usize>> for AxisSlice {
    fn from(range: RangeTo<usize>) -> Self {
        Self::new(0, Some(range.end), 1)
    }
}

/// One element of a point list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point<'a> {
    Index(usize),
    Label(&'a str),
}

impl From<usize> for Point<'_> {
    fn from(index: usize) -> Self {
        Point::Index(index)
    }
}

impl<'a> From<&'a str> for Point<'a> {
    fn from(label: &'a str) -> Self {
        Point::Label(label)
    }
}

/// One component of a compound key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    /// Storage index, used as is
    Index(usize),
    /// Label resolved through the axis's dimension
    Label(&'a str),
    /// Several positions along the axis. A single point behaves like a
    /// scalar component and drops the axis from the result.
    Points(Vec<Point<'a>>),
    Slice(AxisSlice),
}

impl<'a> Key<'a> {
    /// Point list made of labels only
    pub fn labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Key::Points(labels.into_iter().map(Point::Label).collect())
    }

    /// Point list made of storage indices only
    pub fn indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Key::Points(indices.into_iter().map(Point::Index).collect())
    }
}

impl From<usize> for Key<'_> {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(label: &'a str) -> Self {
        Key::Label(label)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(label: &'a String) -> Self {
        Key::Label(label.as_str())
    }
}

impl<'a> From<Vec<Point<'a>>> for Key<'a> {
    fn from(points: Vec<Point<'a>>) -> Self {
        Key::Points(points)
    }
}

impl<'a> From<Vec<&'a str>> for Key<'a> {
    fn from(labels: Vec<&'a str>) -> Self {
        Key::labels(labels)
    }
}

impl From<AxisSlice> for Key<'_> {
    fn from(slice: AxisSlice) -> Self {
        Key::Slice(slice)
    }
}

impl From<RangeFull> for Key<'_> {
    fn from(range: RangeFull) -> Self {
        Key::Slice(range.into())
    }
}

impl From<Range<usize>> for Key<'_> {
    fn from(range: Range<usize>) -> Self {
        Key::Slice(range.into())
    }
}

impl From<RangeFrom<usize>> for Key<'_> {
    fn from(range: RangeFrom<usize>) -> Self {
        Key::Slice(range.into())
    }
}

impl From<RangeTo<usize>> for Key<'_> {
    fn from(range: RangeTo<usize>) -> Self {
        Key::Slice(range.into())
    }
}

/// Resolved storage coordinate for one axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisIndex {
    Index(usize),
    Slice(AxisSlice),
    /// Two or more storage indices
    Points(Vec<usize>),
}

/// Dense array over axes bound to shared dimensions
#[derive(Debug, Clone)]
pub struct LabeledArray {
    name: String,
    axes: Vec<DimensionId>,
    data: ArrayD<f64>,
}

impl LabeledArray {
    /// Allocate an array sized to each axis's capacity, filled with NaN.
    ///
    /// Capacities whose product cannot be allocated are a
    /// [`ReasError::Configuration`] error.
    pub fn new(
        name: impl Into<String>,
        axes: Vec<DimensionId>,
        registry: &DimensionRegistry,
    ) -> Result<Self> {
        let name = name.into();
        let shape = axes
            .iter()
            .map(|&id| registry.get(id).map(Dimension::capacity))
            .collect::<Result<Vec<usize>>>()?;

        let too_large = || ReasError::Configuration {
            message: format!(
                "array '{}' with shape {:?} is too large to allocate; lower the capacities",
                name, shape
            ),
        };
        let cells = shape
            .iter()
            .try_fold(1usize, |acc, &len| acc.checked_mul(len))
            .filter(|&cells| cells <= isize::MAX as usize / std::mem::size_of::<f64>())
            .ok_or_else(too_large)?;

        let mut values = Vec::new();
        values.try_reserve_exact(cells).map_err(|_| too_large())?;
        values.resize(cells, MISSING);
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| too_large())?;

        Ok(Self { name, axes, data })
    }

    /// Wrap existing data; one axis per array dimension
    pub fn from_data(
        name: impl Into<String>,
        axes: Vec<DimensionId>,
        data: ArrayD<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if axes.len() != data.ndim() {
            return Err(ReasError::DimensionMismatch {
                array: name,
                expected: data.ndim(),
                found: axes.len(),
            });
        }
        Ok(Self { name, axes, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axes(&self) -> &[DimensionId] {
        &self.axes
    }

    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Underlying storage, in raw positional order
    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    /// Reset every cell to `value`
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Resolve one key component against axis `axis`
    fn resolve_axis(
        &self,
        registry: &DimensionRegistry,
        axis: usize,
        component: &Key<'_>,
    ) -> Result<AxisIndex> {
        let dim_id = self.axes[axis];
        let len = self.data.shape()[axis];

        let point = |p: &Point<'_>| -> Result<usize> {
            let index = match *p {
                Point::Index(i) => i,
                Point::Label(label) => registry.lookup(dim_id, label)?,
            };
            self.check_bounds(registry, axis, index, len)
        };

        match component {
            Key::Index(i) => Ok(AxisIndex::Index(point(&Point::Index(*i))?)),
            Key::Label(label) => Ok(AxisIndex::Index(point(&Point::Label(*label))?)),
            Key::Points(points) => {
                let indices = points.iter().map(point).collect::<Result<Vec<_>>>()?;
                match indices.as_slice() {
                    [] => Err(ReasError::InvalidSlice {
                        dimension: self.axis_name(registry, axis),
                        reason: "empty point list".to_string(),
                    }),
                    [single] => Ok(AxisIndex::Index(*single)),
                    _ => Ok(AxisIndex::Points(indices)),
                }
            }
            Key::Slice(slice) => {
                let invalid = |reason: String| ReasError::InvalidSlice {
                    dimension: self.axis_name(registry, axis),
                    reason,
                };
                if slice.step == 0 {
                    return Err(invalid("step must be at least 1".to_string()));
                }
                if slice.start > len || slice.end.is_some_and(|end| end > len) {
                    return Err(invalid(format!(
                        "{}..{:?} exceeds axis length {}",
                        slice.start, slice.end, len
                    )));
                }
                // any step of at least `len` selects only `start`
                let step = slice.step.min(len.max(1));
                Ok(AxisIndex::Slice(AxisSlice { step, ..*slice }))
            }
        }
    }

    /// Resolve a compound key, one component per axis
    pub fn resolve(
        &self,
        registry: &DimensionRegistry,
        key: &[Key<'_>],
    ) -> Result<Vec<AxisIndex>> {
        if key.len() != self.ndim() {
            return Err(ReasError::DimensionMismatch {
                array: self.name.clone(),
                expected: self.ndim(),
                found: key.len(),
            });
        }
        key.iter()
            .enumerate()
            .map(|(axis, component)| self.resolve_axis(registry, axis, component))
            .collect()
    }

    /// Copy out the selection addressed by `key`
    pub fn get(&self, registry: &DimensionRegistry, key: &[Key<'_>]) -> Result<ArrayD<f64>> {
        let resolved = self.resolve(registry, key)?;

        let mut current = CowArray::from(self.data.view());
        for (axis, index) in resolved.iter().enumerate() {
            if let AxisIndex::Points(points) = index {
                current = CowArray::from(current.select(Axis(axis), points));
            }
        }

        let elems = resolved
            .iter()
            .map(|index| match index {
                AxisIndex::Index(i) => SliceInfoElem::Index(*i as isize),
                AxisIndex::Slice(slice) => slice.to_elem(),
                // already gathered above
                AxisIndex::Points(_) => AxisSlice::full().to_elem(),
            })
            .collect();
        let info = self.slice_info(elems)?;
        Ok(current.slice(&info).to_owned())
    }

    /// Single cell addressed by a key with no slices or point lists
    pub fn get_value(&self, registry: &DimensionRegistry, key: &[Key<'_>]) -> Result<f64> {
        let resolved = self.resolve(registry, key)?;
        let mut position = Vec::with_capacity(resolved.len());
        for index in &resolved {
            match index {
                AxisIndex::Index(i) => position.push(*i),
                _ => {
                    return Err(ReasError::ShapeMismatch {
                        array: self.name.clone(),
                        expected: Vec::new(),
                        found: self.selection_shape(&resolved),
                    });
                }
            }
        }
        Ok(self.data[IxDyn(&position)])
    }

    /// Write `value` to every cell of the selection
    pub fn set(&mut self, registry: &DimensionRegistry, key: &[Key<'_>], value: f64) -> Result<()> {
        let resolved = self.resolve(registry, key)?;
        self.write(&resolved, |mut target, _| {
            target.fill(value);
            Ok(())
        })
    }

    /// Copy `value` into the selection; shapes must match exactly
    pub fn assign(
        &mut self,
        registry: &DimensionRegistry,
        key: &[Key<'_>],
        value: &ArrayViewD<'_, f64>,
    ) -> Result<()> {
        let resolved = self.resolve(registry, key)?;
        let expected = self.selection_shape(&resolved);
        if value.shape() != expected.as_slice() {
            return Err(ReasError::ShapeMismatch {
                array: self.name.clone(),
                expected,
                found: value.shape().to_vec(),
            });
        }
        self.write(&resolved, |mut target, source_info| {
            target.assign(&value.slice(source_info));
            Ok(())
        })
    }

    /// Copy of the data restricted to the assigned labels of each axis
    pub fn compacted(&self, registry: &DimensionRegistry) -> Result<ArrayD<f64>> {
        let mut view = self.data.view();
        for (axis, &id) in self.axes.iter().enumerate() {
            let used = registry.get(id)?.len().min(view.shape()[axis]);
            view.slice_axis_inplace(Axis(axis), ndarray::Slice::from(0..used));
        }
        Ok(view.to_owned())
    }

    fn axis_name(&self, registry: &DimensionRegistry, axis: usize) -> String {
        registry.get(self.axes[axis]).map_or_else(
            |_| format!("{} axis {}", self.name, axis),
            |dim| dim.name().to_string(),
        )
    }

    fn check_bounds(
        &self,
        registry: &DimensionRegistry,
        axis: usize,
        index: usize,
        len: usize,
    ) -> Result<usize> {
        if index < len {
            Ok(index)
        } else {
            Err(ReasError::IndexOutOfBounds {
                dimension: self.axis_name(registry, axis),
                index,
                len,
            })
        }
    }

    fn selection_shape(&self, resolved: &[AxisIndex]) -> Vec<usize> {
        resolved
            .iter()
            .zip(self.data.shape())
            .filter_map(|(index, &len)| match index {
                AxisIndex::Index(_) => None,
                AxisIndex::Slice(slice) => Some(slice.selected_len(len)),
                AxisIndex::Points(points) => Some(points.len()),
            })
            .collect()
    }

    fn slice_info(
        &self,
        elems: Vec<SliceInfoElem>,
    ) -> Result<SliceInfo<Vec<SliceInfoElem>, IxDyn, IxDyn>> {
        SliceInfo::try_from(elems).map_err(|e| ReasError::InvalidSlice {
            dimension: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// Visit the storage regions covered by `resolved`.
    ///
    /// Point lists are expanded one combination at a time; for each, `f`
    /// receives the target region and the matching slice of a value laid
    /// out in selection order.
    fn write<F>(&mut self, resolved: &[AxisIndex], mut f: F) -> Result<()>
    where
        F: FnMut(
            ArrayViewMutD<'_, f64>,
            &SliceInfo<Vec<SliceInfoElem>, IxDyn, IxDyn>,
        ) -> Result<()>,
    {
        let point_axes: Vec<&[usize]> = resolved
            .iter()
            .filter_map(|index| match index {
                AxisIndex::Points(points) => Some(points.as_slice()),
                _ => None,
            })
            .collect();
        let mut cursor = vec![0usize; point_axes.len()];

        loop {
            let mut target = Vec::with_capacity(resolved.len());
            let mut source = Vec::new();
            let mut nth_point = 0;
            for index in resolved {
                match index {
                    AxisIndex::Index(i) => target.push(SliceInfoElem::Index(*i as isize)),
                    AxisIndex::Slice(slice) => {
                        target.push(slice.to_elem());
                        source.push(AxisSlice::full().to_elem());
                    }
                    AxisIndex::Points(points) => {
                        let j = cursor[nth_point];
                        target.push(SliceInfoElem::Index(points[j] as isize));
                        source.push(SliceInfoElem::Index(j as isize));
                        nth_point += 1;
                    }
                }
            }

            let target = self.slice_info(target)?;
            let source = self.slice_info(source)?;
            f(self.data.slice_mut(&target), &source)?;

            // odometer over the point lists, last axis fastest
            let mut advanced = false;
            for k in (0..cursor.len()).rev() {
                cursor[k] += 1;
                if cursor[k] < point_axes[k].len() {
                    advanced = true;
                    break;
                }
                cursor[k] = 0;
            }
            if !advanced {
                return Ok(());
            }
        }
    }
}
