//! Date type for delivery-period calculations.

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

use crate::error::{HeliosError, HeliosResult};

/// First representable date; lower bound of the "Always" range.
pub static START_OF_WORLD: Lazy<Date> = Lazy::new(|| Date(NaiveDate::MIN));

/// Upper bound of the "Always" range, held 365 days short of the
/// representable maximum so sentinel arithmetic cannot overflow.
pub static END_OF_WORLD: Lazy<Date> = Lazy::new(|| Date(NaiveDate::MAX) - 365);

/// A calendar date for delivery-period calculations.
///
/// A newtype wrapper around `chrono::NaiveDate` providing the calendar
/// operations the range-type system needs.
///
/// # Example
///
/// ```rust
/// use helios_core::types::Date;
///
/// let date = Date::from_ymd(2016, 4, 15).unwrap();
/// assert_eq!(date.quarter(), 2);
/// assert_eq!(date.end_of_month().day(), 30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a new date from year, month, and day.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::InvalidDate` if the date is invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> HeliosResult<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| HeliosError::invalid_date(format!("{year}-{month:02}-{day:02}")))
    }

    /// Parses an ISO 8601 date string (`YYYY-MM-DD`, non-padded accepted).
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::InvalidDate` if the string is not a valid date.
    pub fn parse(s: &str) -> HeliosResult<Self> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Date)
            .map_err(|_| HeliosError::invalid_date(format!("Cannot parse: {s}")))
    }

    /// Returns the year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Returns the calendar quarter (1-4).
    #[must_use]
    pub fn quarter(&self) -> u32 {
        (self.month() - 1) / 3 + 1
    }

    /// Checks if the year is a leap year.
    #[must_use]
    pub fn is_leap_year(&self) -> bool {
        self.0.leap_year()
    }

    /// Returns the number of days in the date's month.
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if self.is_leap_year() => 29,
            2 => 28,
            _ => unreachable!(),
        }
    }

    /// Adds a number of days to the date.
    #[must_use]
    pub fn add_days(&self, days: i64) -> Self {
        Date(self.0 + chrono::Duration::days(days))
    }

    /// Calculates the number of calendar days between two dates.
    #[must_use]
    pub fn days_between(&self, other: &Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Returns the underlying `NaiveDate`.
    #[must_use]
    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }

    /// Returns the first day of the month.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        Date(
            NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
                .expect("first of month should always be valid"),
        )
    }

    /// Returns the last day of the month.
    #[must_use]
    pub fn end_of_month(&self) -> Self {
        Date(
            NaiveDate::from_ymd_opt(self.year(), self.month(), self.days_in_month())
                .expect("end of month should always be valid"),
        )
    }

    /// Returns the Monday of the date's ISO week.
    #[must_use]
    pub fn start_of_week(&self) -> Self {
        self.add_days(-i64::from(self.0.weekday().num_days_from_monday()))
    }

    /// Returns the ISO week-numbering `(year, week)` pair.
    ///
    /// Week 1 is the week containing January 4th.
    #[must_use]
    pub fn iso_year_week(&self) -> (i32, u32) {
        let iso = self.0.iso_week();
        (iso.year(), iso.week())
    }

    /// Returns the day of week.
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Checks if the date is a weekend (Saturday or Sunday).
    #[must_use]
    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Checks if the date is a weekday (Monday through Friday).
    #[must_use]
    pub fn is_weekday(&self) -> bool {
        !self.is_weekend()
    }

    /// Returns the minimum of two dates.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }

    /// Returns the maximum of two dates.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }
}

/// Counts the weekdays (Mon-Fri) between two dates, inclusive.
///
/// Runs in O(1): whole weeks contribute five days each, the residual
/// partial week is resolved from the start weekday.
#[must_use]
pub fn weekday_count(start: Date, end: Date) -> i64 {
    if start > end {
        return 0;
    }
    let days = end - start + 1;
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let mut day = start.add_days(full_weeks * 7);
    while day <= end {
        if day.is_weekday() {
            count += 1;
        }
        day = day.add_days(1);
    }
    count
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        date.0
    }
}

impl Add<i64> for Date {
    type Output = Self;

    /// Adds days to a date.
    fn add(self, days: i64) -> Self::Output {
        self.add_days(days)
    }
}

impl Sub<i64> for Date {
    type Output = Self;

    /// Subtracts days from a date.
    fn sub(self, days: i64) -> Self::Output {
        self.add_days(-days)
    }
}

impl Sub<Date> for Date {
    type Output = i64;

    /// Returns the number of days between two dates.
    fn sub(self, other: Date) -> Self::Output {
        other.days_between(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_creation() {
        let date = Date::from_ymd(2016, 6, 15).unwrap();
        assert_eq!(date.year(), 2016);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 15);
        assert_eq!(date.quarter(), 2);
    }

    #[test]
    fn test_invalid_date() {
        assert!(Date::from_ymd(2025, 2, 30).is_err());
        assert!(Date::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn test_parse_loose() {
        // chrono accepts non-padded components for %m / %d
        assert_eq!(
            Date::parse("2012-1-26").unwrap(),
            Date::from_ymd(2012, 1, 26).unwrap()
        );
        assert!(Date::parse("2012-Q1").is_err());
    }

    #[test]
    fn test_month_boundaries() {
        let date = Date::from_ymd(2016, 2, 10).unwrap();
        assert_eq!(date.start_of_month(), Date::from_ymd(2016, 2, 1).unwrap());
        assert_eq!(date.end_of_month(), Date::from_ymd(2016, 2, 29).unwrap());
    }

    #[test]
    fn test_iso_week() {
        // 2016-01-04 falls in ISO week 1 of 2016
        let date = Date::from_ymd(2016, 1, 4).unwrap();
        assert_eq!(date.iso_year_week(), (2016, 1));
        // 2016-01-01 belongs to the last week of 2015
        let date = Date::from_ymd(2016, 1, 1).unwrap();
        assert_eq!(date.iso_year_week(), (2015, 53));
        // start_of_week is always a Monday
        let date = Date::from_ymd(2016, 1, 6).unwrap();
        assert_eq!(date.start_of_week(), Date::from_ymd(2016, 1, 4).unwrap());
    }

    #[test]
    fn test_weekday_count() {
        // Mon 2025-01-06 .. Fri 2025-01-10: five weekdays
        let mon = Date::from_ymd(2025, 1, 6).unwrap();
        let fri = Date::from_ymd(2025, 1, 10).unwrap();
        assert_eq!(weekday_count(mon, fri), 5);
        // full week including weekend
        assert_eq!(weekday_count(mon, mon.add_days(6)), 5);
        // Dec 2012 has 21 weekdays
        let start = Date::from_ymd(2012, 12, 1).unwrap();
        let end = Date::from_ymd(2012, 12, 31).unwrap();
        assert_eq!(weekday_count(start, end), 21);
        // empty range
        assert_eq!(weekday_count(fri, mon), 0);
    }

    #[test]
    fn test_date_arithmetic_operators() {
        let d1 = Date::from_ymd(2025, 1, 1).unwrap();
        let d2 = d1 + 10;
        assert_eq!(d2.day(), 11);
        assert_eq!(d2 - d1, 10);
        assert_eq!((d2 - 5).day(), 6);
    }

    #[test]
    fn test_world_bounds() {
        assert!(*START_OF_WORLD < *END_OF_WORLD);
        assert!(*END_OF_WORLD + 365 > *END_OF_WORLD);
        assert_eq!(*END_OF_WORLD + 365, Date(NaiveDate::MAX));
    }

    #[test]
    fn test_serde() {
        let date = Date::from_ymd(2016, 6, 15).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        let parsed: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(date, parsed);
    }
}
