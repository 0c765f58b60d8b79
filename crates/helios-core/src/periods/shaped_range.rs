//! Date ranges restricted to an hours-of-week pattern.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HeliosResult;
use crate::periods::date_range::{DateRange, NEVER_DR};
use crate::periods::load_shape::{LoadShape, BASE, NEVER_LS};
use crate::periods::range_type::RangeType;
use crate::types::Date;

/// The canonical empty shaped range.
pub static NEVER_LSDR: Lazy<LoadShapedDateRange> = Lazy::new(|| LoadShapedDateRange {
    date_range: *NEVER_DR,
    load_shape: NEVER_LS,
});

/// A [`DateRange`] delivering only during the hours of a [`LoadShape`].
///
/// An empty date range or a zero load shape collapses to the canonical
/// [`NEVER_LSDR`] instance at construction, so emptiness checks reduce to
/// an equality test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoadShapedDateRange {
    date_range: DateRange,
    load_shape: LoadShape,
}

impl LoadShapedDateRange {
    /// Creates a shaped range, collapsing empties to the sentinel.
    #[must_use]
    pub fn new(date_range: DateRange, load_shape: LoadShape) -> Self {
        if date_range.is_never() || load_shape.is_never() {
            *NEVER_LSDR
        } else {
            Self {
                date_range,
                load_shape,
            }
        }
    }

    /// Creates a BASE-shaped range.
    #[must_use]
    pub fn base(date_range: DateRange) -> Self {
        Self::new(date_range, BASE)
    }

    /// The date component.
    #[must_use]
    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    /// The hours-of-week component.
    #[must_use]
    pub fn load_shape(&self) -> LoadShape {
        self.load_shape
    }

    /// First date of the range.
    #[must_use]
    pub fn start(&self) -> Date {
        self.date_range.start()
    }

    /// Last date of the range.
    #[must_use]
    pub fn end(&self) -> Date {
        self.date_range.end()
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_never(&self) -> bool {
        self == &*NEVER_LSDR
    }

    /// Duration in shaped days: each weekday contributes the weekday load
    /// factor, each weekend day the weekend load factor.
    #[must_use]
    pub fn duration(&self) -> f64 {
        let (weekdays, weekends) = self.date_range.weekday_and_weekend_duration();
        weekdays as f64 * self.load_shape.weekday_load_factor()
            + weekends as f64 * self.load_shape.weekend_load_factor()
    }

    /// Hours common to both shaped ranges; the sentinel when empty.
    #[must_use]
    pub fn intersection(&self, other: &LoadShapedDateRange) -> LoadShapedDateRange {
        if self.load_shape.intersects(&other.load_shape)
            && self.date_range.intersects(&other.date_range)
        {
            LoadShapedDateRange::new(
                self.date_range.intersection(&other.date_range),
                self.load_shape.intersection(&other.load_shape),
            )
        } else {
            *NEVER_LSDR
        }
    }

    /// Whether the shaped ranges share delivery hours.
    ///
    /// The bitwise and interval tests run first; only when both pass is the
    /// intersection's duration computed, since a weekend-only shape over a
    /// weekday-only range still has zero delivery.
    #[must_use]
    pub fn intersects(&self, other: &LoadShapedDateRange) -> bool {
        self.load_shape.intersects(&other.load_shape)
            && self.date_range.intersects(&other.date_range)
            && self.intersection(other).duration() > 0.0
    }

    /// Whether both cover the identical set of delivery hours, possibly
    /// through different representations.
    #[must_use]
    pub fn equivalent(&self, other: &LoadShapedDateRange) -> bool {
        let duration = self.duration();
        self.intersection(other).duration() == duration && duration == other.duration()
    }

    /// Whether `other` lies entirely inside this shaped range.
    #[must_use]
    pub fn contains(&self, other: &LoadShapedDateRange) -> bool {
        self.date_range.contains(&other.date_range)
            && self.load_shape.contains(&other.load_shape)
    }

    /// Whether `date` has any delivery hours in this range.
    #[must_use]
    pub fn contains_date(&self, date: Date) -> bool {
        self.date_range.contains_date(date)
            && if date.is_weekday() {
                self.load_shape.weekday_load_factor() > 0.0
            } else {
                self.load_shape.weekend_load_factor() > 0.0
            }
    }

    /// The delivery hours of `self` outside `other`, as a triple: the days
    /// before `other` and after `other` keep this range's shape; the days
    /// shared with `other` carry the shape difference.
    #[must_use]
    pub fn difference(&self, other: &LoadShapedDateRange) -> [LoadShapedDateRange; 3] {
        let (before, after) = self.date_range.difference(&other.date_range);
        let mid = self.date_range.intersection(&other.date_range);
        let mid_shape = self.load_shape.difference(&other.load_shape);
        [
            LoadShapedDateRange::new(before, self.load_shape),
            LoadShapedDateRange::new(mid, mid_shape),
            LoadShapedDateRange::new(after, self.load_shape),
        ]
    }

    /// Splits the date component, keeping the shape.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::split_by_range_type`] failures.
    pub fn split_by_range_type(
        &self,
        range_type: RangeType,
    ) -> HeliosResult<Vec<LoadShapedDateRange>> {
        Ok(self
            .date_range
            .split_by_range_type(range_type)?
            .into_iter()
            .map(|dr| LoadShapedDateRange::new(dr, self.load_shape))
            .collect())
    }

    /// Splits into calendar months, keeping the shape.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::split_by_range_type`] failures.
    pub fn split_by_month(&self) -> HeliosResult<Vec<LoadShapedDateRange>> {
        self.split_by_range_type(RangeType::Month)
    }

    /// Splits into calendar quarters, keeping the shape.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::split_by_range_type`] failures.
    pub fn split_by_quarter(&self) -> HeliosResult<Vec<LoadShapedDateRange>> {
        self.split_by_range_type(RangeType::Quarter)
    }

    /// Expands to the enclosing range of `range_type`, keeping the shape.
    ///
    /// # Errors
    ///
    /// Propagates the bounding failure of the range type.
    pub fn expand(&self, range_type: RangeType) -> HeliosResult<LoadShapedDateRange> {
        Ok(LoadShapedDateRange::new(
            self.date_range.expand(range_type)?,
            self.load_shape,
        ))
    }

    /// The shaped range `shift` calendar units away.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::offset`] failures.
    pub fn offset(&self, shift: i64) -> HeliosResult<LoadShapedDateRange> {
        Ok(LoadShapedDateRange::new(
            self.date_range.offset(shift)?,
            self.load_shape,
        ))
    }

    /// Iterates the days with delivery, each as a single-day shaped range.
    ///
    /// Days whose class carries no load (e.g. weekends under a weekday-only
    /// shape) are skipped.
    pub fn days(&self) -> impl Iterator<Item = LoadShapedDateRange> {
        let shape = self.load_shape;
        let weekday_load = shape.weekday_load_factor() > 0.0;
        let weekend_load = shape.weekend_load_factor() > 0.0;
        self.date_range
            .days()
            .filter(move |d| {
                if d.is_weekday() {
                    weekday_load
                } else {
                    weekend_load
                }
            })
            .map(move |d| LoadShapedDateRange::new(DateRange::day(d), shape))
    }
}

impl From<DateRange> for LoadShapedDateRange {
    fn from(date_range: DateRange) -> Self {
        LoadShapedDateRange::base(date_range)
    }
}

impl fmt::Display for LoadShapedDateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date_range, self.load_shape)
    }
}
