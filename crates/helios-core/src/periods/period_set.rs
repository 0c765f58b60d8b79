//! Homogeneous sets of delivery periods and their partition into atoms.
//!
//! The partition is the combinatorial core of curve bootstrapping: it maps a
//! collection of possibly-overlapping periods to the coarsest set of
//! pairwise-disjoint equivalence classes such that every input period is a
//! union of classes. A class may hold several disjoint pieces, so classes
//! are themselves sets.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{HeliosError, HeliosResult};
use crate::periods::date_range::{date_ranges, DateRange};
use crate::periods::load_shape::{partition_load_shapes, LoadShape, BASE};
use crate::periods::shaped_range::LoadShapedDateRange;
use crate::types::Date;

/// A set of load shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadShapeSet {
    shapes: BTreeSet<LoadShape>,
}

impl LoadShapeSet {
    /// Builds a set from any shape collection.
    pub fn new<I: IntoIterator<Item = LoadShape>>(shapes: I) -> Self {
        Self {
            shapes: shapes.into_iter().collect(),
        }
    }

    /// Number of distinct shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates the shapes in bitmap order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadShape> {
        self.shapes.iter()
    }

    /// Set union.
    #[must_use]
    pub fn union(&self, other: &LoadShapeSet) -> LoadShapeSet {
        Self {
            shapes: self.shapes.union(&other.shapes).copied().collect(),
        }
    }

    /// Whether any member shares an hour with `shape`.
    #[must_use]
    pub fn intersects(&self, shape: &LoadShape) -> bool {
        self.shapes.iter().any(|s| s.intersects(shape))
    }

    /// Equivalence classes of the hour-bit membership relation.
    #[must_use]
    pub fn partition(&self) -> Vec<LoadShape> {
        let shapes: Vec<LoadShape> = self.shapes.iter().copied().collect();
        partition_load_shapes(&shapes)
    }
}

/// A set of date ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRangeSet {
    ranges: BTreeSet<DateRange>,
}

impl DateRangeSet {
    /// Builds a set from any range collection; empty sentinels are dropped.
    pub fn new<I: IntoIterator<Item = DateRange>>(ranges: I) -> Self {
        Self {
            ranges: ranges.into_iter().filter(|r| !r.is_never()).collect(),
        }
    }

    /// Number of distinct ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates the ranges in `(start, end)` order.
    pub fn iter(&self) -> impl Iterator<Item = &DateRange> {
        self.ranges.iter()
    }

    /// Adds a range to the set.
    pub fn insert(&mut self, range: DateRange) {
        if !range.is_never() {
            self.ranges.insert(range);
        }
    }

    /// Set union.
    #[must_use]
    pub fn union(&self, other: &DateRangeSet) -> DateRangeSet {
        Self {
            ranges: self.ranges.union(&other.ranges).copied().collect(),
        }
    }

    /// Whether any member shares a day with `range`.
    #[must_use]
    pub fn intersects(&self, range: &DateRange) -> bool {
        self.ranges.iter().any(|r| r.intersects(range))
    }

    /// Total days across members (members may overlap).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.ranges.iter().map(DateRange::duration).sum()
    }

    /// Equivalence classes of the date membership relation.
    ///
    /// Every member start and every member end-plus-one-day is a breakpoint;
    /// the runs between consecutive breakpoints are atoms; atoms covered by
    /// the same subset of members form one class. Atoms covered by nothing
    /// (gaps between members) are discarded. Classes are returned in order
    /// of their earliest atom.
    #[must_use]
    pub fn partition(&self) -> Vec<DateRangeSet> {
        let members: Vec<DateRange> = self.ranges.iter().copied().collect();
        let mut breakpoints: BTreeSet<Date> = BTreeSet::new();
        for range in &members {
            breakpoints.insert(range.start());
            breakpoints.insert(range.end() + 1);
        }
        let breakpoints: Vec<Date> = breakpoints.into_iter().collect();
        let mut classes: HashMap<Vec<usize>, DateRangeSet> = HashMap::new();
        for atom in date_ranges(&breakpoints) {
            let signature: Vec<usize> = members
                .iter()
                .enumerate()
                .filter(|(_, member)| member.intersects(&atom))
                .map(|(i, _)| i)
                .collect();
            if signature.is_empty() {
                continue;
            }
            classes.entry(signature).or_default().insert(atom);
        }
        let mut result: Vec<DateRangeSet> = classes.into_values().collect();
        result.sort();
        result
    }

    /// The partition classes intersecting `range`.
    ///
    /// The partition is recomputed on each call, since the set stays mutable
    /// through [`insert`](Self::insert). Callers querying a fixed set
    /// repeatedly should hold the result of [`partition`](Self::partition)
    /// and filter it themselves.
    #[must_use]
    pub fn partition_intersecting(&self, range: &DateRange) -> Vec<DateRangeSet> {
        self.partition()
            .into_iter()
            .filter(|class| class.intersects(range))
            .collect()
    }
}

/// A set of load-shaped date ranges.
///
/// `default_shape` is present only when every member carries the same load
/// shape; mixed-type set operations use it to promote plain date ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapedRangeSet {
    items: BTreeSet<LoadShapedDateRange>,
    default_shape: Option<LoadShape>,
}

impl ShapedRangeSet {
    /// Builds a set from shaped ranges; empty sentinels are dropped and the
    /// default shape is recorded when all members agree.
    pub fn new<I: IntoIterator<Item = LoadShapedDateRange>>(items: I) -> Self {
        let items: BTreeSet<LoadShapedDateRange> =
            items.into_iter().filter(|i| !i.is_never()).collect();
        let default_shape = common_shape(&items);
        Self {
            items,
            default_shape,
        }
    }

    /// Promotes a [`DateRangeSet`] by attaching `shape` to every member.
    #[must_use]
    pub fn promoted(ranges: &DateRangeSet, shape: LoadShape) -> Self {
        Self::new(
            ranges
                .iter()
                .map(|r| LoadShapedDateRange::new(*r, shape)),
        )
    }

    /// Number of distinct members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates the members in order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadShapedDateRange> {
        self.items.iter()
    }

    /// The shape shared by every member, when one exists.
    #[must_use]
    pub fn default_shape(&self) -> Option<LoadShape> {
        self.default_shape
    }

    /// Set union.
    #[must_use]
    pub fn union(&self, other: &ShapedRangeSet) -> ShapedRangeSet {
        Self::new(self.items.union(&other.items).copied())
    }

    /// Whether any member delivers during `period`.
    #[must_use]
    pub fn intersects(&self, period: &LoadShapedDateRange) -> bool {
        self.items.iter().any(|i| i.intersects(period))
    }

    /// Member-wise intersection with `period`, dropping empty pieces.
    #[must_use]
    pub fn intersection(&self, period: &LoadShapedDateRange) -> ShapedRangeSet {
        Self::new(self.items.iter().map(|i| i.intersection(period)))
    }

    /// Total shaped days across members (members may overlap).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.items.iter().map(LoadShapedDateRange::duration).sum()
    }

    /// Equivalence classes of the joint date-and-hour membership relation.
    ///
    /// The projected date ranges are partitioned first; within each date
    /// class, the shapes of the members active there are partitioned in
    /// turn. Each (date class, shape class) cell is keyed by the members
    /// delivering in it, and cells with identical membership merge into one
    /// class.
    #[must_use]
    pub fn partition(&self) -> Vec<ShapedRangeSet> {
        let members: Vec<LoadShapedDateRange> = self.items.iter().copied().collect();
        let date_set = DateRangeSet::new(members.iter().map(|i| i.date_range()));
        let mut classes: HashMap<Vec<usize>, ShapedRangeSet> = HashMap::new();
        for date_class in date_set.partition() {
            let base_cell = ShapedRangeSet::promoted(&date_class, BASE);
            let active_shapes = LoadShapeSet::new(
                members
                    .iter()
                    .filter(|m| base_cell.intersects(m))
                    .map(|m| m.load_shape()),
            );
            for shape_class in active_shapes.partition() {
                let cell = ShapedRangeSet::promoted(&date_class, shape_class);
                let signature: Vec<usize> = members
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| cell.intersects(m))
                    .map(|(i, _)| i)
                    .collect();
                if signature.is_empty() {
                    continue;
                }
                match classes.entry(signature) {
                    std::collections::hash_map::Entry::Occupied(mut e) => {
                        let merged = e.get().union(&cell);
                        e.insert(merged);
                    }
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(cell);
                    }
                }
            }
        }
        let mut result: Vec<ShapedRangeSet> = classes.into_values().collect();
        result.sort();
        log::debug!(
            "partitioned {} periods into {} classes",
            members.len(),
            result.len()
        );
        result
    }

    /// The partition classes intersecting `period`.
    ///
    /// The partition is recomputed on each call. Callers querying a fixed
    /// set repeatedly should hold the result of
    /// [`partition`](Self::partition) and filter it themselves, as the curve
    /// bootstrap does with its atom classes.
    #[must_use]
    pub fn partition_intersecting(&self, period: &LoadShapedDateRange) -> Vec<ShapedRangeSet> {
        self.partition()
            .into_iter()
            .filter(|class| class.intersects(period))
            .collect()
    }
}

fn common_shape(items: &BTreeSet<LoadShapedDateRange>) -> Option<LoadShape> {
    let mut iter = items.iter();
    let first = iter.next()?.load_shape();
    iter.all(|i| i.load_shape() == first).then_some(first)
}

/// A homogeneous collection of time periods.
///
/// Mixed-type operations are rejected with a `TypeMismatch` error; the
/// closed variant set makes the supported item types explicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriodSet {
    /// Hours-of-week patterns.
    LoadShapes(LoadShapeSet),
    /// Plain date ranges.
    DateRanges(DateRangeSet),
    /// Load-shaped date ranges.
    Shaped(ShapedRangeSet),
}

impl TimePeriodSet {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::LoadShapes(s) => s.len(),
            Self::DateRanges(s) => s.len(),
            Self::Shaped(s) => s.len(),
        }
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::LoadShapes(_) => "LoadShapeSet",
            Self::DateRanges(_) => "DateRangeSet",
            Self::Shaped(_) => "ShapedRangeSet",
        }
    }

    /// Set union of two sets of the same item type. A date-range set and a
    /// shaped set unify when the shaped side has a default shape, promoting
    /// the plain ranges with it.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the item types cannot be unified.
    pub fn union(&self, other: &TimePeriodSet) -> HeliosResult<TimePeriodSet> {
        match (self, other) {
            (Self::LoadShapes(a), Self::LoadShapes(b)) => Ok(Self::LoadShapes(a.union(b))),
            (Self::DateRanges(a), Self::DateRanges(b)) => Ok(Self::DateRanges(a.union(b))),
            (Self::Shaped(a), Self::Shaped(b)) => Ok(Self::Shaped(a.union(b))),
            (Self::DateRanges(a), Self::Shaped(b)) | (Self::Shaped(b), Self::DateRanges(a)) => {
                let shape = b.default_shape().ok_or_else(|| {
                    HeliosError::type_mismatch("a shaped set with a default shape", "mixed shapes")
                })?;
                Ok(Self::Shaped(ShapedRangeSet::promoted(a, shape).union(b)))
            }
            _ => Err(HeliosError::type_mismatch(self.kind(), other.kind())),
        }
    }

    /// Whether the two sets share any delivery. Follows the same unification
    /// rules as [`union`](Self::union): a date-range set tests against a
    /// shaped set through the latter's default shape.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the item types cannot be unified.
    pub fn intersects(&self, other: &TimePeriodSet) -> HeliosResult<bool> {
        match (self, other) {
            (Self::LoadShapes(a), Self::LoadShapes(b)) => Ok(b.iter().any(|s| a.intersects(s))),
            (Self::DateRanges(a), Self::DateRanges(b)) => Ok(b.iter().any(|r| a.intersects(r))),
            (Self::Shaped(a), Self::Shaped(b)) => Ok(b.iter().any(|p| a.intersects(p))),
            (Self::DateRanges(a), Self::Shaped(b)) | (Self::Shaped(b), Self::DateRanges(a)) => {
                let shape = b.default_shape().ok_or_else(|| {
                    HeliosError::type_mismatch("a shaped set with a default shape", "mixed shapes")
                })?;
                let promoted = ShapedRangeSet::promoted(a, shape);
                Ok(b.iter().any(|p| promoted.intersects(p)))
            }
            _ => Err(HeliosError::type_mismatch(self.kind(), other.kind())),
        }
    }

    /// Partitions the set into equivalence classes of the same item type.
    #[must_use]
    pub fn partition(&self) -> Vec<TimePeriodSet> {
        match self {
            Self::LoadShapes(s) => s
                .partition()
                .into_iter()
                .map(|shape| Self::LoadShapes(LoadShapeSet::new([shape])))
                .collect(),
            Self::DateRanges(s) => s.partition().into_iter().map(Self::DateRanges).collect(),
            Self::Shaped(s) => s.partition().into_iter().map(Self::Shaped).collect(),
        }
    }
}
