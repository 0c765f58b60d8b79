//! Calendar range types.
//!
//! A [`RangeType`] knows how to validate, bound, parse, format and shift a
//! date range of its kind. The set of types is closed: dispatch is a plain
//! `match`, so exhaustiveness is checked at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HeliosError, HeliosResult};
use crate::types::{Date, END_OF_WORLD, START_OF_WORLD};

/// The kind of calendar range a pair of dates delimits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeType {
    /// A single day.
    Day,
    /// An ISO week, Monday through Sunday.
    Week,
    /// A calendar month.
    Month,
    /// A calendar quarter.
    Quarter,
    /// The summer season, April 1st through September 30th.
    Summer,
    /// The winter season, October 1st through March 31st of the next year.
    Winter,
    /// A calendar year.
    Year,
    /// A gas year, October 1st through September 30th of the next year.
    GasYear,
    /// The empty sentinel range.
    Never,
    /// The full representable date domain.
    Always,
}

/// Probe order for deriving a type from bounds and for text parsing.
pub const ALL_RANGE_TYPES: [RangeType; 10] = [
    RangeType::Never,
    RangeType::Always,
    RangeType::Day,
    RangeType::Week,
    RangeType::Month,
    RangeType::Quarter,
    RangeType::Summer,
    RangeType::Winter,
    RangeType::Year,
    RangeType::GasYear,
];

impl RangeType {
    /// Resolves a range-type alias such as `"m"`, `"qtr"` or `"gas year"`.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::Parse` for unknown aliases.
    pub fn from_alias(alias: &str) -> HeliosResult<Self> {
        let alias = alias.trim().to_lowercase();
        match alias.as_str() {
            "day" | "d" => Ok(Self::Day),
            "week" | "wk" | "w" => Ok(Self::Week),
            "month" | "mth" | "m" => Ok(Self::Month),
            "quarter" | "qtr" | "q" => Ok(Self::Quarter),
            "summer" | "sum" => Ok(Self::Summer),
            "winter" | "win" => Ok(Self::Winter),
            "year" | "yr" | "y" => Ok(Self::Year),
            "gasyear" | "gas year" | "gas_year" | "gy" => Ok(Self::GasYear),
            "never" | "nat" | "na" => Ok(Self::Never),
            "always" | "forever" => Ok(Self::Always),
            _ => Err(HeliosError::parse(alias, "a calendar range type alias")),
        }
    }

    /// Whether `(start, end)` delimits exactly one range of this type.
    #[must_use]
    pub fn validate(&self, start: Date, end: Date) -> bool {
        match self {
            Self::Day => start == end,
            Self::Week => {
                start.weekday() == chrono::Weekday::Mon && end == start + 6
            }
            Self::Month => {
                start == start.start_of_month()
                    && end == start.end_of_month()
                    && start.month() == end.month()
                    && start.year() == end.year()
            }
            Self::Quarter => self
                .bound(start)
                .map_or(false, |(s, e)| s == start && e == end),
            Self::Summer | Self::Winter | Self::Year | Self::GasYear => self
                .bound(start)
                .map_or(false, |(s, e)| s == start && e == end),
            Self::Never => start == *END_OF_WORLD && end == *START_OF_WORLD,
            Self::Always => start == *START_OF_WORLD && end == *END_OF_WORLD,
        }
    }

    /// The bounds of the range of this type containing `date`.
    ///
    /// # Errors
    ///
    /// `DateOutOfSeason` when probing Summer/Winter with a date of the other
    /// season; `InvalidDate` for the degenerate sentinel types.
    pub fn bound(&self, date: Date) -> HeliosResult<(Date, Date)> {
        match self {
            Self::Day => Ok((date, date)),
            Self::Week => {
                let start = date.start_of_week();
                Ok((start, start + 6))
            }
            Self::Month => Ok((date.start_of_month(), date.end_of_month())),
            Self::Quarter => {
                let start_month = 3 * (date.quarter() - 1) + 1;
                let start = Date::from_ymd(date.year(), start_month, 1)?;
                let end = month_shift(start, 3)?.0 - 1;
                Ok((start, end))
            }
            Self::Summer => {
                let month = date.month();
                if !(4..=9).contains(&month) {
                    return Err(out_of_season(date, *self));
                }
                Ok((
                    Date::from_ymd(date.year(), 4, 1)?,
                    Date::from_ymd(date.year(), 9, 30)?,
                ))
            }
            Self::Winter => {
                let year = match date.month() {
                    1..=3 => date.year() - 1,
                    10..=12 => date.year(),
                    _ => return Err(out_of_season(date, *self)),
                };
                Ok((
                    Date::from_ymd(year, 10, 1)?,
                    Date::from_ymd(year + 1, 3, 31)?,
                ))
            }
            Self::Year => Ok((
                Date::from_ymd(date.year(), 1, 1)?,
                Date::from_ymd(date.year(), 12, 31)?,
            )),
            Self::GasYear => {
                let year = if date.month() > 9 {
                    date.year()
                } else {
                    date.year() - 1
                };
                Ok((
                    Date::from_ymd(year, 10, 1)?,
                    Date::from_ymd(year + 1, 9, 30)?,
                ))
            }
            Self::Never | Self::Always => Err(HeliosError::invalid_date(format!(
                "the {self} range type has no bounding range"
            ))),
        }
    }

    /// Parses a lowercased token into the bounds of a range of this type.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::Parse` when the token does not match this
    /// type's grammar.
    pub fn parse(&self, token: &str) -> HeliosResult<(Date, Date)> {
        match self {
            Self::Day => {
                if token.matches('-').count() >= 2 {
                    if let Ok(date) = Date::parse(token) {
                        return self.bound(date);
                    }
                }
                Err(expected(token, "'YYYY-MM-DD' or similar"))
            }
            Self::Week => {
                let (year, n) = tagged_token(token, "w")
                    .ok_or_else(|| expected(token, "'YYYY-Wn' or similar"))?;
                let week1 = Date::from_ymd(year, 1, 4)?.start_of_week();
                let start = week1 + 7 * (n - 1);
                Ok((start, start + 6))
            }
            Self::Month => {
                let (year, n) = tagged_token(token, "m")
                    .ok_or_else(|| expected(token, "'YYYY-Mn' or similar"))?;
                if !(1..=12).contains(&n) {
                    return Err(expected(token, "'YYYY-Mn' or similar"));
                }
                self.bound(Date::from_ymd(year, n as u32, 1)?)
            }
            Self::Quarter => {
                let (year, n) = tagged_token(token, "q")
                    .ok_or_else(|| expected(token, "'YYYY-Qn' or similar"))?;
                if !(1..=4).contains(&n) {
                    return Err(expected(token, "'YYYY-Qn' or similar"));
                }
                self.bound(Date::from_ymd(year, 3 * n as u32, 1)?)
            }
            Self::Summer => {
                let year = seasonal_token(token, "sum")
                    .ok_or_else(|| expected(token, "'YYYY-SUM' or similar"))?;
                self.bound(Date::from_ymd(year, 4, 1)?)
            }
            Self::Winter => {
                let year = seasonal_token(token, "win")
                    .ok_or_else(|| expected(token, "'YYYY-WIN' or similar"))?;
                self.bound(Date::from_ymd(year, 10, 1)?)
            }
            Self::Year => {
                if token.len() == 4 {
                    if let Ok(year) = token.parse::<i32>() {
                        return self.bound(Date::from_ymd(year, 1, 1)?);
                    }
                }
                Err(expected(token, "'YYYY'"))
            }
            Self::GasYear => {
                let year = seasonal_token(token, "gy")
                    .ok_or_else(|| expected(token, "'GY-YYYY' or similar"))?;
                self.bound(Date::from_ymd(year, 10, 1)?)
            }
            Self::Never => {
                if matches!(token, "never" | "nat" | "na") {
                    Ok((*END_OF_WORLD, *START_OF_WORLD))
                } else {
                    Err(expected(token, "one of 'never', 'nat', 'na'"))
                }
            }
            Self::Always => {
                if matches!(token, "always" | "forever") {
                    Ok((*START_OF_WORLD, *END_OF_WORLD))
                } else {
                    Err(expected(token, "one of 'always', 'forever'"))
                }
            }
        }
    }

    /// Bounds of the range `offset` steps away from the range starting at
    /// `start`. A step is one unit of this type; for seasons an odd offset
    /// lands on the other season.
    ///
    /// # Errors
    ///
    /// `InvalidDate` for the sentinel types or out-of-domain arithmetic.
    pub fn shifted(&self, start: Date, offset: i64) -> HeliosResult<(Date, Date)> {
        match self {
            Self::Day => Ok((start + offset, start + offset)),
            Self::Week => {
                let shifted = start.start_of_week() + 7 * offset;
                Ok((shifted, shifted + 6))
            }
            Self::Month => month_shift(start, offset),
            Self::Quarter => month_shift(start, 3 * offset).and_then(|(s, _)| self.bound(s)),
            Self::Summer => {
                let year = start.year() + i32::try_from(offset.div_euclid(2)).unwrap_or(0);
                if offset.rem_euclid(2) == 1 {
                    Self::Winter.bound(Date::from_ymd(year, 10, 1)?)
                } else {
                    Self::Summer.bound(Date::from_ymd(year, 4, 1)?)
                }
            }
            Self::Winter => {
                let year = start.year() + i32::try_from((offset + 1).div_euclid(2)).unwrap_or(0);
                if offset.rem_euclid(2) == 1 {
                    Self::Summer.bound(Date::from_ymd(year, 4, 1)?)
                } else {
                    Self::Winter.bound(Date::from_ymd(year, 10, 1)?)
                }
            }
            Self::Year => {
                let year = start.year() + i32::try_from(offset).unwrap_or(0);
                self.bound(Date::from_ymd(year, 1, 1)?)
            }
            Self::GasYear => {
                let year = start.year() + i32::try_from(offset).unwrap_or(0);
                self.bound(Date::from_ymd(year, 10, 1)?)
            }
            Self::Never | Self::Always => Err(HeliosError::invalid_date(format!(
                "the {self} range type cannot be shifted"
            ))),
        }
    }

    /// Canonical text for a `(start, end)` pair of this type; the inverse of
    /// [`RangeType::parse`].
    #[must_use]
    pub fn format(&self, start: Date, _end: Date) -> String {
        match self {
            Self::Day => start.to_string(),
            Self::Week => {
                let (year, week) = start.iso_year_week();
                format!("{year}-W{week}")
            }
            Self::Month => format!("{}-M{}", start.year(), start.month()),
            Self::Quarter => format!("{}-Q{}", start.year(), start.quarter()),
            Self::Summer => format!("{}-SUM", start.year()),
            Self::Winter => format!("{}-WIN", start.year()),
            Self::Year => start.year().to_string(),
            Self::GasYear => format!("GY-{}", start.year()),
            Self::Never => "Never".to_string(),
            Self::Always => "Always".to_string(),
        }
    }

    /// The other season; identity for everything that is not a season.
    #[must_use]
    pub fn opposite_season(&self) -> Self {
        match self {
            Self::Summer => Self::Winter,
            Self::Winter => Self::Summer,
            other => *other,
        }
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Summer => "Summer",
            Self::Winter => "Winter",
            Self::Year => "Year",
            Self::GasYear => "GasYear",
            Self::Never => "Never",
            Self::Always => "Always",
        };
        f.write_str(name)
    }
}

/// Month bounds `offset` months after the month containing `start`.
fn month_shift(start: Date, offset: i64) -> HeliosResult<(Date, Date)> {
    let total = i64::from(start.year()) * 12 + i64::from(start.month()) - 1 + offset;
    let year = i32::try_from(total.div_euclid(12))
        .map_err(|_| HeliosError::invalid_date("month shift out of bounds"))?;
    let month = (total.rem_euclid(12) + 1) as u32;
    let first = Date::from_ymd(year, month, 1)?;
    Ok((first, first.end_of_month()))
}

fn out_of_season(date: Date, range_type: RangeType) -> HeliosError {
    HeliosError::DateOutOfSeason {
        date: date.to_string(),
        range_type: range_type.to_string(),
    }
}

fn expected(token: &str, what: &str) -> HeliosError {
    HeliosError::parse(token, what)
}

/// Splits a two-part token like `"2016-q2"` / `"q2-2016"` into the 4-digit
/// year and the numeric suffix of the tagged part. Both orders accepted.
fn tagged_token(token: &str, tag: &str) -> Option<(i32, i64)> {
    let (a, b) = token.split_once('-')?;
    let (year_part, tag_part) = if is_year(a) { (a, b) } else { (b, a) };
    if !is_year(year_part) {
        return None;
    }
    let rest = tag_part.strip_prefix(tag)?;
    let year = year_part.parse().ok()?;
    let n = rest.parse().ok()?;
    Some((year, n))
}

/// Splits `"2016-sum"` / `"sum-2016"`-style tokens where the tag carries no
/// number of its own.
fn seasonal_token(token: &str, tag: &str) -> Option<i32> {
    let (a, b) = token.split_once('-')?;
    let (year_part, tag_part) = if is_year(a) { (a, b) } else { (b, a) };
    if tag_part != tag || !is_year(year_part) {
        return None;
    }
    year_part.parse().ok()
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}
