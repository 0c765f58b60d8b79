//! Settlement conventions mapping delivery periods to payment dates.

use chrono::Weekday;
use helios_core::periods::{LoadShapedDateRange, RangeType};
use helios_core::types::Date;
use serde::{Deserialize, Serialize};

use crate::discount::DiscountCurve;
use crate::error::CurveResult;

/// Market settlement convention for a delivery period.
///
/// Each rule splits a period into settlement units and assigns the payment
/// date of each unit; discounting weights a unit's duration by the discount
/// factor at its payment date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementRule {
    /// Each delivery day settles on the day itself.
    DayOfDelivery,
    /// Gas convention: each month settles 20 days after the month end.
    Gas,
    /// UK power convention: each month settles on the 14th calendar day
    /// after the month end, pulled back a day for Saturday month ends and
    /// two for Sunday month ends.
    UkPower,
    /// Emissions allowances: each year settles the day after the year end.
    Eua,
}

impl SettlementRule {
    /// The settlement units of `period` and their payment dates.
    ///
    /// # Errors
    ///
    /// Propagates calendar failures from splitting the period.
    pub fn settlement_dates(
        &self,
        period: &LoadShapedDateRange,
    ) -> CurveResult<Vec<(LoadShapedDateRange, Date)>> {
        if period.is_never() {
            return Ok(Vec::new());
        }
        match self {
            Self::DayOfDelivery => Ok(period.days().map(|day| (day, day.start())).collect()),
            Self::Gas => {
                let months = period.split_by_month()?;
                months
                    .into_iter()
                    .map(|month| {
                        let month_end = month.expand(RangeType::Month)?.end();
                        Ok((month, month_end + 20))
                    })
                    .collect()
            }
            Self::UkPower => {
                let months = period.split_by_month()?;
                months
                    .into_iter()
                    .map(|month| {
                        let month_end = month.expand(RangeType::Month)?.end();
                        let lag = match month_end.weekday() {
                            Weekday::Sat => 13,
                            Weekday::Sun => 12,
                            _ => 14,
                        };
                        Ok((month, month_end + lag))
                    })
                    .collect()
            }
            Self::Eua => {
                let years = period.split_by_range_type(RangeType::Year)?;
                years
                    .into_iter()
                    .map(|year| {
                        let year_end = year.expand(RangeType::Year)?.end();
                        Ok((year, year_end + 1))
                    })
                    .collect()
            }
        }
    }

    /// The period's duration with each settlement unit weighted by the
    /// discount factor at its payment date.
    ///
    /// # Errors
    ///
    /// Propagates calendar failures from splitting the period.
    pub fn discounted_duration(
        &self,
        period: &LoadShapedDateRange,
        discount_curve: &dyn DiscountCurve,
    ) -> CurveResult<f64> {
        Ok(self
            .settlement_dates(period)?
            .iter()
            .map(|(unit, date)| unit.duration() * discount_curve.factor(*date))
            .sum())
    }
}
