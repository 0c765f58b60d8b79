//! Hours-of-week delivery patterns as 48-bit bitmaps.
//!
//! Bits 0-23 are weekday hours 0-23, bits 24-47 the weekend hours. A shape
//! is a plain `Copy` value; structural equality on the bitmap makes every
//! bitmap canonical without an interning table.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{HeliosError, HeliosResult};

const WEEKDAY_MASK: u64 = (1 << 24) - 1;
const WEEKEND_MASK: u64 = WEEKDAY_MASK << 24;
const FULL_MASK: u64 = WEEKDAY_MASK | WEEKEND_MASK;

const fn bitmap(start_hour: u32, end_hour: u32, weekdays: bool, weekends: bool) -> u64 {
    let span = ((1u64 << end_hour) - 1) ^ ((1u64 << start_hour) - 1);
    let mut bits = 0;
    if weekdays {
        bits |= span;
    }
    if weekends {
        bits |= span << 24;
    }
    bits
}

/// A pattern of hours-of-week during which delivery applies.
///
/// # Example
///
/// ```rust
/// use helios_core::periods::{LoadShape, BASE, PEAK, OFFPEAK};
///
/// assert_eq!(PEAK.complement(), OFFPEAK);
/// assert_eq!(PEAK.union(&OFFPEAK), BASE);
/// assert!(PEAK.within(&BASE));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LoadShape(u64);

/// All 48 hours of the week.
pub const BASE: LoadShape = LoadShape(bitmap(0, 24, true, true));
/// Weekday hours 8-19 inclusive.
pub const PEAK: LoadShape = LoadShape(bitmap(8, 20, true, false));
/// Everything outside [`PEAK`].
pub const OFFPEAK: LoadShape = LoadShape(BASE.0 & !PEAK.0);
/// All weekday hours.
pub const WEEKDAY: LoadShape = LoadShape(bitmap(0, 24, true, false));
/// Weekday hours outside [`PEAK`].
pub const WEEKDAY_OFFPEAK: LoadShape = LoadShape(WEEKDAY.0 & !PEAK.0);
/// All weekend hours.
pub const WEEKEND: LoadShape = LoadShape(bitmap(0, 24, false, true));
/// Weekend hours 8-19 inclusive.
pub const WEEKEND_PEAK: LoadShape = LoadShape(bitmap(8, 20, false, true));
/// Weekend hours outside [`WEEKEND_PEAK`].
pub const WEEKEND_OFFPEAK: LoadShape = LoadShape(WEEKEND.0 & !WEEKEND_PEAK.0);
/// Hours 8-19 on every day.
pub const DAYTIME: LoadShape = LoadShape(PEAK.0 | WEEKEND_PEAK.0);
/// Everything outside [`DAYTIME`].
pub const NIGHTTIME: LoadShape = LoadShape(BASE.0 & !DAYTIME.0);
/// Hours 8-23 on every day.
pub const EXTENDED_DAYTIME: LoadShape = LoadShape(bitmap(8, 24, true, true));
/// Weekday hours 8-23.
pub const EXTENDED_PEAK: LoadShape = LoadShape(bitmap(8, 24, true, false));
/// Weekend hours 8-23.
pub const WEEKEND_EXTENDED_PEAK: LoadShape = LoadShape(EXTENDED_DAYTIME.0 & !EXTENDED_PEAK.0);
/// The empty shape.
pub const NEVER_LS: LoadShape = LoadShape(0);

const NAMED_SHAPES: &[(LoadShape, &str)] = &[
    (BASE, "Base"),
    (PEAK, "Peak"),
    (OFFPEAK, "Offpeak"),
    (WEEKDAY, "Weekday"),
    (WEEKDAY_OFFPEAK, "Weekday Offpeak"),
    (WEEKEND, "Weekend"),
    (WEEKEND_PEAK, "Weekend Peak"),
    (WEEKEND_OFFPEAK, "Weekend Offpeak"),
    (DAYTIME, "Daytime"),
    (NIGHTTIME, "Nighttime"),
    (EXTENDED_DAYTIME, "Extended Daytime"),
    (EXTENDED_PEAK, "Extended Peak"),
    (WEEKEND_EXTENDED_PEAK, "Weekend Extended Peak"),
    (NEVER_LS, "Never"),
];

impl LoadShape {
    /// Creates a shape from a raw bitmap; bits above 47 are masked off.
    #[must_use]
    pub fn from_bitmap(bits: u64) -> Self {
        Self(bits & FULL_MASK)
    }

    /// Creates a shape covering `[start_hour, end_hour)` on the selected
    /// day classes.
    #[must_use]
    pub fn from_hours(start_hour: u32, end_hour: u32, weekdays: bool, weekends: bool) -> Self {
        debug_assert!(start_hour < end_hour && end_hour <= 24);
        Self(bitmap(start_hour, end_hour, weekdays, weekends))
    }

    /// The single-hour shape for `hour` on both day classes.
    #[must_use]
    pub fn single_hour(hour: u32) -> Self {
        Self::from_hours(hour, hour + 1, true, true)
    }

    /// The raw bitmap.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Whether the two shapes share an hour.
    #[must_use]
    pub fn intersects(&self, other: &LoadShape) -> bool {
        self.0 & other.0 != 0
    }

    /// Hours common to both shapes.
    #[must_use]
    pub fn intersection(&self, other: &LoadShape) -> LoadShape {
        LoadShape(self.0 & other.0)
    }

    /// Hours in either shape.
    #[must_use]
    pub fn union(&self, other: &LoadShape) -> LoadShape {
        LoadShape(self.0 | other.0)
    }

    /// Hours of `self` not in `other`.
    #[must_use]
    pub fn difference(&self, other: &LoadShape) -> LoadShape {
        LoadShape(self.0 ^ (self.0 & other.0))
    }

    /// Hours outside this shape.
    #[must_use]
    pub fn complement(&self) -> LoadShape {
        BASE.difference(self)
    }

    /// Whether `other` lies entirely inside this shape.
    #[must_use]
    pub fn contains(&self, other: &LoadShape) -> bool {
        self.intersects(other) && self.intersection(other) == *other
    }

    /// Whether this shape lies entirely inside `other`.
    #[must_use]
    pub fn within(&self, other: &LoadShape) -> bool {
        other.contains(self)
    }

    /// Whether the shape holds no hours.
    #[must_use]
    pub fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// Number of set hour-bits.
    #[must_use]
    pub fn hour_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Fraction of a weekday covered by this shape.
    #[must_use]
    pub fn weekday_load_factor(&self) -> f64 {
        f64::from((self.0 & WEEKDAY_MASK).count_ones()) / 24.0
    }

    /// Fraction of a weekend day covered by this shape.
    #[must_use]
    pub fn weekend_load_factor(&self) -> f64 {
        f64::from((self.0 & WEEKEND_MASK).count_ones()) / 24.0
    }

    /// Whether the shape is a single hour of day: one weekday hour, one
    /// weekend hour, or the same hour set once in each half.
    #[must_use]
    pub fn is_hour(&self) -> bool {
        let weekday = self.0 & WEEKDAY_MASK;
        let weekend = (self.0 & WEEKEND_MASK) >> 24;
        match (weekday.count_ones(), weekend.count_ones()) {
            (1, 0) | (0, 1) => true,
            (1, 1) => weekday == weekend,
            _ => false,
        }
    }

    /// The hour of day of a single-hour shape.
    ///
    /// # Errors
    ///
    /// `InvalidDate` when the shape is not hourly.
    pub fn hour(&self) -> HeliosResult<u32> {
        if !self.is_hour() {
            return Err(HeliosError::invalid_date(format!(
                "hour is only defined for hourly shapes, got {self}"
            )));
        }
        let weekend = (self.0 & WEEKEND_MASK) >> 24;
        if weekend != 0 {
            Ok(weekend.trailing_zeros())
        } else {
            Ok((self.0 & WEEKDAY_MASK).trailing_zeros())
        }
    }

    /// Iterates over the set bits as single-bit shapes.
    pub fn iter_bits(&self) -> impl Iterator<Item = LoadShape> {
        let bits = self.0;
        (0..48)
            .filter(move |bit| bits & (1 << bit) != 0)
            .map(|bit| LoadShape(1 << bit))
    }
}

/// Coarsest set of pairwise-disjoint shapes such that every member of
/// `shapes` is a union of some subset of the result.
///
/// Each of the 48 hour-bits is keyed by the subset of `shapes` covering it;
/// bits with identical membership are merged, bits covered by nothing are
/// dropped. The result is sorted by bitmap for determinism.
#[must_use]
pub fn partition_load_shapes(shapes: &[LoadShape]) -> Vec<LoadShape> {
    let mut classes: HashMap<Vec<usize>, u64> = HashMap::new();
    for bit in 0..48u64 {
        let mask = 1 << bit;
        let signature: Vec<usize> = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| shape.0 & mask != 0)
            .map(|(i, _)| i)
            .collect();
        if signature.is_empty() {
            continue;
        }
        *classes.entry(signature).or_insert(0) |= mask;
    }
    let mut result: Vec<LoadShape> = classes.into_values().map(LoadShape).collect();
    result.sort_unstable();
    result
}

impl FromStr for LoadShape {
    type Err = HeliosError;

    fn from_str(s: &str) -> HeliosResult<Self> {
        let token = s.trim().to_lowercase();
        NAMED_SHAPES
            .iter()
            .find(|(_, name)| name.to_lowercase() == token)
            .map(|(shape, _)| *shape)
            .ok_or_else(|| HeliosError::parse(s, "a named load shape"))
    }
}

impl fmt::Display for LoadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((_, name)) = NAMED_SHAPES.iter().find(|(shape, _)| shape == self) {
            return f.write_str(name);
        }
        let weekday = (0..24)
            .map(|h| if self.0 & (1 << h) != 0 { '1' } else { '0' })
            .collect::<String>();
        let weekend = (24..48)
            .map(|h| if self.0 & (1 << h) != 0 { '1' } else { '0' })
            .collect::<String>();
        write!(f, "weekdays: {weekday}, weekends: {weekend}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_named_shape_identities() {
        assert_eq!(BASE.hour_count(), 48);
        assert_eq!(PEAK.hour_count(), 12);
        assert_eq!(PEAK.union(&OFFPEAK), BASE);
        assert!(!PEAK.intersects(&OFFPEAK));
        assert_eq!(WEEKDAY.union(&WEEKEND), BASE);
        assert_eq!(DAYTIME.complement(), NIGHTTIME);
        assert_eq!(BASE.complement(), NEVER_LS);
        assert_eq!(OFFPEAK, WEEKDAY_OFFPEAK.union(&WEEKEND));
    }

    #[test]
    fn test_containment() {
        assert!(BASE.contains(&PEAK));
        assert!(PEAK.within(&WEEKDAY));
        assert!(!PEAK.within(&WEEKEND));
        assert!(!NEVER_LS.within(&BASE));
    }

    #[test]
    fn test_load_factors() {
        assert_relative_eq!(BASE.weekday_load_factor(), 1.0);
        assert_relative_eq!(PEAK.weekday_load_factor(), 0.5);
        assert_relative_eq!(PEAK.weekend_load_factor(), 0.0);
        assert_relative_eq!(OFFPEAK.weekday_load_factor(), 0.5);
        assert_relative_eq!(OFFPEAK.weekend_load_factor(), 1.0);
    }

    #[test]
    fn test_hourly_shapes() {
        let h7 = LoadShape::single_hour(7);
        assert!(h7.is_hour());
        assert_eq!(h7.hour().unwrap(), 7);
        let weekday_h7 = h7.intersection(&WEEKDAY);
        assert!(weekday_h7.is_hour());
        assert_eq!(weekday_h7.hour().unwrap(), 7);
        assert!(!PEAK.is_hour());
        assert!(PEAK.hour().is_err());
        // same count in both halves but different hours is not an hour
        let skew = LoadShape::from_hours(3, 4, true, false)
            .union(&LoadShape::from_hours(5, 6, false, true));
        assert!(!skew.is_hour());
    }

    #[test]
    fn test_iter_bits() {
        assert_eq!(PEAK.iter_bits().count(), 12);
        assert_eq!(
            PEAK.iter_bits().fold(NEVER_LS, |acc, b| acc.union(&b)),
            PEAK
        );
        assert_eq!(NEVER_LS.iter_bits().count(), 0);
    }

    #[test]
    fn test_partition_peak_base() {
        let classes = partition_load_shapes(&[PEAK, BASE]);
        assert_eq!(classes.len(), 2);
        assert!(classes.contains(&PEAK));
        assert!(classes.contains(&OFFPEAK));
    }

    #[test]
    fn test_partition_singleton_and_disjointness() {
        assert_eq!(partition_load_shapes(&[WEEKDAY]), vec![WEEKDAY]);
        let classes = partition_load_shapes(&[PEAK, WEEKDAY, BASE]);
        for (i, a) in classes.iter().enumerate() {
            for b in &classes[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
        // every input is a union of classes
        for input in [PEAK, WEEKDAY, BASE] {
            let rebuilt = classes
                .iter()
                .filter(|c| c.within(&input))
                .fold(NEVER_LS, |acc, c| acc.union(c));
            assert_eq!(rebuilt, input);
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("peak".parse::<LoadShape>().unwrap(), PEAK);
        assert_eq!(" Weekend Offpeak ".parse::<LoadShape>().unwrap(), WEEKEND_OFFPEAK);
        assert!("gibberish".parse::<LoadShape>().is_err());
        assert_eq!(PEAK.to_string(), "Peak");
        assert_eq!(NEVER_LS.to_string(), "Never");
        let anon = LoadShape::from_hours(0, 1, true, false);
        assert!(anon.to_string().starts_with("weekdays: 1"));
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&PEAK).unwrap();
        let parsed: LoadShape = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PEAK);
    }
}
