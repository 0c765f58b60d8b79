//! Closed intervals of calendar dates.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HeliosError, HeliosResult};
use crate::periods::range_type::{RangeType, ALL_RANGE_TYPES};
use crate::types::{weekday_count, Date, END_OF_WORLD, START_OF_WORLD};

/// The canonical empty range.
pub static NEVER_DR: Lazy<DateRange> = Lazy::new(|| DateRange {
    start: *END_OF_WORLD,
    end: *START_OF_WORLD,
});

/// The range spanning the whole representable date domain.
pub static ALWAYS_DR: Lazy<DateRange> = Lazy::new(|| DateRange {
    start: *START_OF_WORLD,
    end: *END_OF_WORLD,
});

/// An immutable closed interval of dates.
///
/// Equality, ordering and hashing are by `(start, end)` only. Construction
/// with `start > end` collapses to the canonical [`NEVER_DR`] sentinel
/// rather than raising; [`DateRange::difference`] relies on this.
///
/// # Example
///
/// ```rust
/// use helios_core::periods::DateRange;
///
/// let q2: DateRange = "2016-Q2".parse().unwrap();
/// assert_eq!(q2.to_string(), "2016-Q2");
/// assert_eq!(q2.split_by_month().unwrap().len(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a range from explicit bounds; `start > end` yields the
    /// `NEVER` sentinel.
    #[must_use]
    pub fn new(start: Date, end: Date) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            *NEVER_DR
        }
    }

    /// Creates the single-day range for `date`.
    #[must_use]
    pub fn day(date: Date) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Creates the range of `range_type` containing `date`.
    ///
    /// # Errors
    ///
    /// Propagates the bounding failure of the range type (sentinel types,
    /// date outside the season).
    pub fn containing(date: Date, range_type: RangeType) -> HeliosResult<Self> {
        let (start, end) = range_type.bound(date)?;
        Ok(Self { start, end })
    }

    /// First date of the range.
    #[must_use]
    pub fn start(&self) -> Date {
        self.start
    }

    /// Last date of the range.
    #[must_use]
    pub fn end(&self) -> Date {
        self.end
    }

    /// Whether this is the empty sentinel.
    #[must_use]
    pub fn is_never(&self) -> bool {
        self == &*NEVER_DR
    }

    /// Derives the calendar range type from the bounds, probing the closed
    /// set of types.
    #[must_use]
    pub fn range_type(&self) -> Option<RangeType> {
        ALL_RANGE_TYPES
            .iter()
            .copied()
            .find(|rt| rt.validate(self.start, self.end))
    }

    /// Number of days in the range; zero for the empty sentinel.
    #[must_use]
    pub fn len(&self) -> i64 {
        if self.start <= self.end {
            self.end - self.start + 1
        } else {
            0
        }
    }

    /// Whether the range holds no days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in days as a float (the unit the curve algebra works in).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.len() as f64
    }

    /// Counts of weekdays and weekend days within the range.
    #[must_use]
    pub fn weekday_and_weekend_duration(&self) -> (i64, i64) {
        let total = self.len();
        if total == 0 {
            return (0, 0);
        }
        let weekdays = weekday_count(self.start, self.end);
        (weekdays, total - weekdays)
    }

    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains_date(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Whether `other` lies entirely inside the range.
    #[must_use]
    pub fn contains(&self, other: &DateRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one day.
    #[must_use]
    pub fn intersects(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The overlap of the two ranges; `NEVER` when disjoint.
    #[must_use]
    pub fn intersection(&self, other: &DateRange) -> DateRange {
        DateRange::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// The days of `self` before and after `other`.
    ///
    /// Either element is `NEVER` when no such days exist.
    #[must_use]
    pub fn difference(&self, other: &DateRange) -> (DateRange, DateRange) {
        let before = if self.start < other.start {
            DateRange::new(self.start, other.start - 1)
        } else {
            *NEVER_DR
        };
        let after = if other.end < self.end {
            DateRange::new(other.end + 1, self.end)
        } else {
            *NEVER_DR
        };
        (before, after)
    }

    /// The range `shift` steps away, where a step is one unit of this
    /// range's derived type.
    ///
    /// # Errors
    ///
    /// `InvalidDate` when no calendar type can be derived from the bounds.
    pub fn offset(&self, shift: i64) -> HeliosResult<DateRange> {
        let range_type = self.range_type().ok_or_else(|| {
            HeliosError::invalid_date(format!("cannot offset untyped range {self}"))
        })?;
        let (start, end) = range_type.shifted(self.start, shift)?;
        Ok(DateRange::new(start, end))
    }

    /// Expands to the enclosing range of `range_type` around the start date.
    ///
    /// # Errors
    ///
    /// Propagates the bounding failure of the range type.
    pub fn expand(&self, range_type: RangeType) -> HeliosResult<DateRange> {
        DateRange::containing(self.start, range_type)
    }

    /// Splits into an ordered, contiguous, gap-free sequence of sub-ranges
    /// of `range_type`; the first and last pieces are clipped back to the
    /// bounds of `self`.
    ///
    /// A probe date falling outside Summer/Winter retries with the other
    /// season, so seasonal splits work from any starting point.
    ///
    /// # Errors
    ///
    /// Propagates bounding failures for non-seasonal types.
    pub fn split_by_range_type(&self, range_type: RangeType) -> HeliosResult<Vec<DateRange>> {
        let first = bound_with_season_fallback(self.start, range_type)?;
        let last = bound_with_season_fallback(self.end, range_type)?;
        if first.start == last.start {
            return Ok(vec![self.intersection(&first)]);
        }
        let mut pieces = vec![self.intersection(&first)];
        let mut current = first.offset(1)?;
        while current.start < last.start {
            pieces.push(current);
            current = current.offset(1)?;
        }
        pieces.push(self.intersection(&last));
        Ok(pieces)
    }

    /// Splits into calendar months.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::split_by_range_type`] failures.
    pub fn split_by_month(&self) -> HeliosResult<Vec<DateRange>> {
        self.split_by_range_type(RangeType::Month)
    }

    /// Splits into calendar quarters.
    ///
    /// # Errors
    ///
    /// Propagates [`DateRange::split_by_range_type`] failures.
    pub fn split_by_quarter(&self) -> HeliosResult<Vec<DateRange>> {
        self.split_by_range_type(RangeType::Quarter)
    }

    /// Iterates over the days of the range.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        let (start, end) = (self.start, self.end);
        std::iter::successors(
            if start <= end { Some(start) } else { None },
            move |d| {
                let next = *d + 1;
                (next <= end).then_some(next)
            },
        )
    }
}

/// Builds the sequence of ranges spanning consecutive breakpoints, each
/// closed on the left and ending the day before the next breakpoint.
#[must_use]
pub fn date_ranges(breakpoints: &[Date]) -> Vec<DateRange> {
    breakpoints
        .windows(2)
        .map(|w| DateRange::new(w[0], w[1] - 1))
        .collect()
}

fn bound_with_season_fallback(date: Date, range_type: RangeType) -> HeliosResult<DateRange> {
    match DateRange::containing(date, range_type) {
        Ok(range) => Ok(range),
        Err(HeliosError::DateOutOfSeason { .. }) => {
            DateRange::containing(date, range_type.opposite_season())
        }
        Err(err) => Err(err),
    }
}

impl FromStr for DateRange {
    type Err = HeliosError;

    fn from_str(s: &str) -> HeliosResult<Self> {
        let token = s.trim().to_lowercase();
        for range_type in ALL_RANGE_TYPES {
            if let Ok((start, end)) = range_type.parse(&token) {
                return Ok(DateRange { start, end });
            }
        }
        Err(HeliosError::parse(s, "a calendar range token"))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range_type() {
            Some(range_type) => f.write_str(&range_type.format(self.start, self.end)),
            None => write!(f, "DateRange({} to {})", self.start, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn dr(s: &str) -> DateRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_reversed_bounds_collapse_to_never() {
        let range = DateRange::new(d(2016, 2, 1), d(2016, 1, 1));
        assert!(range.is_never());
        assert_eq!(range.len(), 0);
        assert_eq!(range, *NEVER_DR);
    }

    #[test]
    fn test_parse_all_families() {
        assert_eq!(dr("2016-04-15"), DateRange::day(d(2016, 4, 15)));
        assert_eq!(dr("2016-Q2"), DateRange::new(d(2016, 4, 1), d(2016, 6, 30)));
        assert_eq!(dr("Q2-2016"), dr("2016-Q2"));
        assert_eq!(dr("2016"), DateRange::new(d(2016, 1, 1), d(2016, 12, 31)));
        assert_eq!(
            dr("2016-WIN"),
            DateRange::new(d(2016, 10, 1), d(2017, 3, 31))
        );
        assert_eq!(dr("never"), *NEVER_DR);
        assert_eq!(dr("ALWAYS"), *ALWAYS_DR);
        assert!("2016-x9".parse::<DateRange>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for token in [
            "2016-04-15", "2016-W2", "2016-M7", "2016-Q2", "2016-SUM", "2016-WIN", "2016",
            "GY-2016", "Never", "Always",
        ] {
            let range = dr(token);
            assert_eq!(range.to_string(), token);
            assert_eq!(dr(&range.to_string()), range);
        }
        // a pair matching no calendar type falls back to the debug form
        let odd = DateRange::new(d(2016, 1, 2), d(2016, 1, 5));
        assert_eq!(odd.to_string(), "DateRange(2016-01-02 to 2016-01-05)");
    }

    #[test]
    fn test_range_type_derivation() {
        assert_eq!(dr("2016-M2").range_type(), Some(RangeType::Month));
        assert_eq!(dr("2016-SUM").range_type(), Some(RangeType::Summer));
        assert_eq!(NEVER_DR.range_type(), Some(RangeType::Never));
        assert_eq!(
            DateRange::new(d(2016, 1, 2), d(2016, 1, 5)).range_type(),
            None
        );
    }

    #[test]
    fn test_intersection_and_difference() {
        let q4 = dr("2012-Q4");
        let dec = dr("2012-M12");
        assert!(q4.intersects(&dec));
        assert_eq!(q4.intersection(&dec), dec);
        let (before, after) = q4.difference(&dec);
        assert_eq!(before, DateRange::new(d(2012, 10, 1), d(2012, 11, 30)));
        assert!(after.is_never());
        let (before, after) = dec.difference(&q4);
        assert!(before.is_never());
        assert!(after.is_never());
    }

    #[test]
    fn test_duration_and_weekday_split() {
        let dec = dr("2012-M12");
        assert_eq!(dec.len(), 31);
        let (weekdays, weekends) = dec.weekday_and_weekend_duration();
        assert_eq!(weekdays, 21);
        assert_eq!(weekends, 10);
        assert_eq!(NEVER_DR.weekday_and_weekend_duration(), (0, 0));
    }

    #[test]
    fn test_offset() {
        assert_eq!(dr("2016-M12").offset(1).unwrap(), dr("2017-M1"));
        assert_eq!(dr("2016-Q1").offset(-1).unwrap(), dr("2015-Q4"));
        assert_eq!(dr("2016-SUM").offset(1).unwrap(), dr("2016-WIN"));
        assert_eq!(dr("2016-WIN").offset(1).unwrap(), dr("2017-SUM"));
        assert!(DateRange::new(d(2016, 1, 2), d(2016, 1, 5)).offset(1).is_err());
    }

    #[test]
    fn test_split_by_month() {
        let q4 = dr("2012-Q4");
        let months = q4.split_by_month().unwrap();
        assert_eq!(months, vec![dr("2012-M10"), dr("2012-M11"), dr("2012-M12")]);
        // partial edges are clipped back to self
        let range = DateRange::new(d(2012, 10, 15), d(2012, 12, 10));
        let months = range.split_by_month().unwrap();
        assert_eq!(months[0], DateRange::new(d(2012, 10, 15), d(2012, 10, 31)));
        assert_eq!(months[1], dr("2012-M11"));
        assert_eq!(months[2], DateRange::new(d(2012, 12, 1), d(2012, 12, 10)));
    }

    #[test]
    fn test_split_single_piece() {
        let feb = dr("2016-M2");
        assert_eq!(feb.split_by_month().unwrap(), vec![feb]);
        assert_eq!(
            DateRange::new(d(2016, 2, 3), d(2016, 2, 10))
                .split_by_month()
                .unwrap(),
            vec![DateRange::new(d(2016, 2, 3), d(2016, 2, 10))]
        );
    }

    #[test]
    fn test_split_by_season_with_fallback() {
        // a calendar year starts in Winter and ends in Winter
        let year = dr("2016");
        let seasons = year.split_by_range_type(RangeType::Summer).unwrap();
        assert_eq!(
            seasons,
            vec![
                DateRange::new(d(2016, 1, 1), d(2016, 3, 31)),
                dr("2016-SUM"),
                DateRange::new(d(2016, 10, 1), d(2016, 12, 31)),
            ]
        );
    }

    #[test]
    fn test_split_is_contiguous_and_exact() {
        let range = DateRange::new(d(2015, 2, 14), d(2016, 7, 3));
        let pieces = range.split_by_quarter().unwrap();
        assert_eq!(pieces.first().unwrap().start(), range.start());
        assert_eq!(pieces.last().unwrap().end(), range.end());
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end() + 1, pair[1].start());
        }
        let total: i64 = pieces.iter().map(DateRange::len).sum();
        assert_eq!(total, range.len());
    }

    #[test]
    fn test_days_iterator() {
        let range = DateRange::new(d(2016, 2, 27), d(2016, 3, 1));
        let days: Vec<Date> = range.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], d(2016, 2, 29));
        assert_eq!(NEVER_DR.days().count(), 0);
    }

    #[test]
    fn test_date_ranges_helper() {
        let breakpoints = vec![d(2016, 1, 1), d(2016, 2, 1), d(2016, 3, 1)];
        let ranges = date_ranges(&breakpoints);
        assert_eq!(ranges, vec![dr("2016-M1"), dr("2016-M2")]);
    }
}
