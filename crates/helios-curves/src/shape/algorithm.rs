//! The shape algorithm: daily and intraday calibrations combined into one
//! ratio between any two period sets.

use std::collections::HashMap;
use std::sync::Arc;

use helios_core::periods::{LoadShapedDateRange, ShapedRangeSet};
use parking_lot::RwLock;

use crate::error::{CurveError, CurveResult};
use crate::shape::calibration::DailyShapeCalibration;
use crate::shape::ratio_curve::{RatioCurve, UnshapedRatioCurve};

/// Source of intraday shape ratios.
///
/// Given an hour-resolution period, an implementation names the coarser
/// daily period the ratio is quoted against and the raw ratio itself.
pub trait IntradayShapeCalibration: Send + Sync {
    /// The `(denominator period, ratio)` pair for a single-hour period.
    ///
    /// # Errors
    ///
    /// `ShapeCalibration` when no ratio is calibrated for the hour.
    fn extract_shape_ratio(
        &self,
        hour: &LoadShapedDateRange,
    ) -> CurveResult<(LoadShapedDateRange, f64)>;
}

/// Decorates a daily ratio curve with intraday shaping.
///
/// A day's relative price is the hour-weighted mean of
/// `ratio * base(denominator)` over the hours the day delivers; a period's
/// price is the duration-weighted mean over its days.
pub struct IntradayShapeRatioCurve {
    base: Arc<dyn RatioCurve>,
    calibration: Arc<dyn IntradayShapeCalibration>,
}

impl IntradayShapeRatioCurve {
    /// Wraps `base` with the intraday `calibration`.
    pub fn new(base: Arc<dyn RatioCurve>, calibration: Arc<dyn IntradayShapeCalibration>) -> Self {
        Self { base, calibration }
    }

    fn daily_price(&self, day: &LoadShapedDateRange) -> CurveResult<f64> {
        let mut value = 0.0;
        let mut time = 0.0;
        for hour_shape in day.load_shape().iter_bits() {
            let hour = LoadShapedDateRange::new(day.date_range(), hour_shape);
            let t = hour.duration();
            if t <= 0.0 {
                continue;
            }
            let (denominator, ratio) = self.calibration.extract_shape_ratio(&hour)?;
            value += ratio * self.base.ratio_price(&denominator)? * t;
            time += t;
        }
        if time <= 0.0 {
            return Err(CurveError::missing_price(day, "day delivers no hours"));
        }
        Ok(value / time)
    }
}

impl RatioCurve for IntradayShapeRatioCurve {
    fn ratio_price(&self, period: &LoadShapedDateRange) -> CurveResult<f64> {
        let mut value = 0.0;
        let mut time = 0.0;
        for day in period.days() {
            let t = day.duration();
            if t <= 0.0 {
                continue;
            }
            value += self.daily_price(&day)? * t;
            time += t;
        }
        if time <= 0.0 {
            return Err(CurveError::missing_price(period, "period delivers no hours"));
        }
        Ok(value / time)
    }
}

/// The full shaping pipeline applied by a forward curve.
///
/// Holds optional daily and intraday calibrations and answers one question:
/// the ratio between the shaped price of one period set and another. Ratio
/// curves are memoized per denominator set, written at most once per key.
pub struct ShapeAlgorithm {
    daily: Option<Arc<dyn DailyShapeCalibration>>,
    intraday: Option<Arc<dyn IntradayShapeCalibration>>,
    cache: RwLock<HashMap<ShapedRangeSet, Arc<dyn RatioCurve>>>,
}

impl ShapeAlgorithm {
    /// An algorithm with no shaping: every ratio is 1.
    #[must_use]
    pub fn unshaped() -> Self {
        Self::new(None, None)
    }

    /// An algorithm applying whichever calibrations are supplied.
    #[must_use]
    pub fn new(
        daily: Option<Arc<dyn DailyShapeCalibration>>,
        intraday: Option<Arc<dyn IntradayShapeCalibration>>,
    ) -> Self {
        Self {
            daily,
            intraday,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// The shaped price of `numerator` relative to `denominator`.
    ///
    /// Both sets are priced off the ratio curve calibrated for
    /// `denominator`, so the result is exact when the numerator nests
    /// within the denominator.
    ///
    /// # Errors
    ///
    /// `ShapeCalibration` or `MissingPrice` when the calibrations do not
    /// cover either set.
    pub fn shape_ratio(
        &self,
        numerator: &ShapedRangeSet,
        denominator: &ShapedRangeSet,
    ) -> CurveResult<f64> {
        if self.daily.is_none() && self.intraday.is_none() {
            return Ok(1.0);
        }
        let curve = self.ratio_curve(denominator)?;
        let above = Self::price_period_set(curve.as_ref(), numerator)?;
        let below = Self::price_period_set(curve.as_ref(), denominator)?;
        Ok(above / below)
    }

    fn ratio_curve(&self, denominator: &ShapedRangeSet) -> CurveResult<Arc<dyn RatioCurve>> {
        if let Some(curve) = self.cache.read().get(denominator) {
            return Ok(Arc::clone(curve));
        }
        let daily: Arc<dyn RatioCurve> = match &self.daily {
            Some(calibration) => calibration.shape_ratio_curve(denominator)?,
            None => Arc::new(UnshapedRatioCurve),
        };
        let curve: Arc<dyn RatioCurve> = match &self.intraday {
            Some(calibration) => Arc::new(IntradayShapeRatioCurve::new(
                daily,
                Arc::clone(calibration),
            )),
            None => daily,
        };
        Ok(Arc::clone(
            self.cache
                .write()
                .entry(denominator.clone())
                .or_insert(curve),
        ))
    }

    fn price_period_set(curve: &dyn RatioCurve, periods: &ShapedRangeSet) -> CurveResult<f64> {
        let mut value = 0.0;
        let mut time = 0.0;
        for period in periods.iter() {
            let t = period.duration();
            if t <= 0.0 {
                continue;
            }
            value += curve.ratio_price(period)? * t;
            time += t;
        }
        if time <= 0.0 {
            return Err(CurveError::shape_calibration(
                "cannot price an empty period set",
            ));
        }
        Ok(value / time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use helios_core::periods::{DateRange, LoadShape, BASE, PEAK, WEEKDAY, WEEKEND};
    use std::collections::HashMap as StdHashMap;

    use crate::shape::calibration::SeasonShapeCalibration;

    fn base(range: &str) -> LoadShapedDateRange {
        LoadShapedDateRange::new(range.parse::<DateRange>().unwrap(), BASE)
    }

    fn set(period: LoadShapedDateRange) -> ShapedRangeSet {
        ShapedRangeSet::new([period])
    }

    #[test]
    fn test_unshaped_ratio_is_one() {
        let algorithm = ShapeAlgorithm::unshaped();
        let ratio = algorithm
            .shape_ratio(&set(base("2016-M1")), &set(base("2016-Q1")))
            .unwrap();
        assert_relative_eq!(ratio, 1.0);
    }

    #[test]
    fn test_daily_ratio_between_nested_periods() {
        let mut s_to_q = StdHashMap::new();
        s_to_q.insert(BASE, [1.0; 4]);
        let mut q_to_m = StdHashMap::new();
        q_to_m.insert(BASE, [1.2, 1.0, 0.9, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let calibration =
            SeasonShapeCalibration::new(s_to_q, q_to_m, vec![(WEEKDAY, 1.0), (WEEKEND, 1.0)])
                .unwrap();
        let algorithm = ShapeAlgorithm::new(Some(Arc::new(calibration)), None);
        // January prices above the quarter, March below
        let jan = algorithm
            .shape_ratio(&set(base("2011-M1")), &set(base("2011-Q1")))
            .unwrap();
        let mar = algorithm
            .shape_ratio(&set(base("2011-M3")), &set(base("2011-Q1")))
            .unwrap();
        assert!(jan > 1.0);
        assert!(mar < 1.0);
        assert_relative_eq!(jan / mar, 1.2 / 0.9, epsilon = 1e-10);
        // the quarter against itself is exactly 1
        let identity = algorithm
            .shape_ratio(&set(base("2011-Q1")), &set(base("2011-Q1")))
            .unwrap();
        assert_relative_eq!(identity, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weekday_weekend_ratio() {
        let mut s_to_q = StdHashMap::new();
        s_to_q.insert(BASE, [1.0; 4]);
        let mut q_to_m = StdHashMap::new();
        q_to_m.insert(BASE, [1.0; 12]);
        let calibration =
            SeasonShapeCalibration::new(s_to_q, q_to_m, vec![(WEEKDAY, 1.1), (WEEKEND, 1.0)])
                .unwrap();
        let algorithm = ShapeAlgorithm::new(Some(Arc::new(calibration)), None);
        let month = "2012-M12".parse::<DateRange>().unwrap();
        let ratio = algorithm
            .shape_ratio(
                &set(LoadShapedDateRange::new(month, WEEKDAY)),
                &set(LoadShapedDateRange::new(month, WEEKEND)),
            )
            .unwrap();
        assert_relative_eq!(ratio, 1.1, epsilon = 1e-10);
    }

    /// A flat intraday calibration quoting every hour against its own day
    /// at a fixed ratio per shape half.
    struct HalfDayCalibration;

    impl IntradayShapeCalibration for HalfDayCalibration {
        fn extract_shape_ratio(
            &self,
            hour: &LoadShapedDateRange,
        ) -> CurveResult<(LoadShapedDateRange, f64)> {
            let day = LoadShapedDateRange::new(hour.date_range(), BASE);
            let ratio = if hour.load_shape().within(&PEAK) {
                1.5
            } else {
                0.75
            };
            Ok((day, ratio))
        }
    }

    #[test]
    fn test_intraday_decorator() {
        let algorithm = ShapeAlgorithm::new(None, Some(Arc::new(HalfDayCalibration)));
        let day = "2012-12-05".parse::<DateRange>().unwrap();
        let ratio = algorithm
            .shape_ratio(
                &set(LoadShapedDateRange::new(day, PEAK)),
                &set(LoadShapedDateRange::new(day, BASE)),
            )
            .unwrap();
        // a weekday delivers 12 peak hours at 1.5 and 12 off-peak at 0.75
        let day_mean = (12.0 * 1.5 + 12.0 * 0.75) / 24.0;
        assert_relative_eq!(ratio, 1.5 / day_mean, epsilon = 1e-10);
    }

    #[test]
    fn test_empty_set_rejected() {
        let algorithm = ShapeAlgorithm::new(None, Some(Arc::new(HalfDayCalibration)));
        let err = algorithm
            .shape_ratio(
                &ShapedRangeSet::new(Vec::<LoadShapedDateRange>::new()),
                &set(base("2016")),
            )
            .unwrap_err();
        assert!(matches!(err, CurveError::ShapeCalibration { .. }));
    }

    #[test]
    fn test_curve_memoized_per_denominator() {
        let algorithm = ShapeAlgorithm::new(None, Some(Arc::new(HalfDayCalibration)));
        let denominator = set(base("2012-M12"));
        let first = algorithm.ratio_curve(&denominator).unwrap();
        let second = algorithm.ratio_curve(&denominator).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_offpeak_shape_detected() {
        // hour shapes outside PEAK are treated as off-peak
        let shape = LoadShape::single_hour(2);
        assert!(!shape.within(&PEAK));
    }
}
