//! Daily shape calibration: ratio tables keyed by season/year hierarchy.

use std::collections::HashMap;
use std::sync::Arc;

use helios_core::periods::{
    DateRange, LoadShape, LoadShapedDateRange, RangeType, ShapedRangeSet,
};
use helios_core::HeliosError;
use parking_lot::RwLock;

use crate::error::{CurveError, CurveResult};
use crate::shape::ratio_curve::DailyShapeRatioCurve;
use crate::shape::tree::ShapeRatioTree;

/// Source of daily shape-ratio curves for a queried period set.
pub trait DailyShapeCalibration: Send + Sync {
    /// The ratio curve covering `periods`, built from calibration data and
    /// memoized per covering period.
    ///
    /// # Errors
    ///
    /// `ShapeCalibration` when the data does not cover `periods`.
    fn shape_ratio_curve(&self, periods: &ShapedRangeSet) -> CurveResult<Arc<DailyShapeRatioCurve>>;
}

/// The common ratio tables: per load shape, year-or-season to quarter
/// ratios indexed by calendar quarter, quarter to month ratios indexed by
/// calendar month, and within-month ratios per sub-shape.
#[derive(Debug, Clone)]
struct RatioTables {
    period_to_quarter: HashMap<LoadShape, [f64; 4]>,
    quarter_to_month: HashMap<LoadShape, [f64; 12]>,
    within_month: Vec<(LoadShape, f64)>,
}

impl RatioTables {
    fn new(
        period_to_quarter: HashMap<LoadShape, [f64; 4]>,
        quarter_to_month: HashMap<LoadShape, [f64; 12]>,
        within_month: Vec<(LoadShape, f64)>,
    ) -> CurveResult<Self> {
        let quarterly: Vec<&LoadShape> = period_to_quarter.keys().collect();
        if !quarterly
            .iter()
            .all(|shape| quarter_to_month.contains_key(shape))
            || period_to_quarter.len() != quarter_to_month.len()
        {
            return Err(CurveError::shape_calibration(
                "quarter and month ratio tables must cover the same load shapes",
            ));
        }
        if within_month.is_empty() {
            return Err(CurveError::shape_calibration(
                "within-month ratios must name at least one sub-shape",
            ));
        }
        Ok(Self {
            period_to_quarter,
            quarter_to_month,
            within_month,
        })
    }

    /// The calibrated shape covering every member of `periods`, smallest
    /// first for determinism.
    fn covering_shape(&self, periods: &ShapedRangeSet) -> CurveResult<LoadShape> {
        let mut candidates: Vec<LoadShape> = self.period_to_quarter.keys().copied().collect();
        candidates.sort_unstable();
        candidates
            .into_iter()
            .find(|shape| periods.iter().all(|p| p.load_shape().within(shape)))
            .ok_or_else(|| {
                CurveError::shape_calibration(
                    "no calibrated load shape covers the periods being priced",
                )
            })
    }

    /// Builds the season/year tree for `period` and bootstraps its curve.
    fn build_curve(&self, period: LoadShapedDateRange) -> CurveResult<DailyShapeRatioCurve> {
        let shape = period.load_shape();
        let quarter_ratios = &self.period_to_quarter[&shape];
        let month_ratios = &self.quarter_to_month[&shape];
        let mut tree = ShapeRatioTree::new(period);
        for quarter in period.split_by_quarter()? {
            let ratio = quarter_ratios[quarter.start().quarter() as usize - 1];
            let quarter_node = tree.add_child(tree.root(), ratio, quarter);
            for month in quarter.split_by_month()? {
                let ratio = month_ratios[month.start().month() as usize - 1];
                let month_node = tree.add_child(quarter_node, ratio, month);
                for &(sub_shape, sub_ratio) in &self.within_month {
                    tree.add_child(
                        month_node,
                        sub_ratio,
                        LoadShapedDateRange::new(month.date_range(), sub_shape),
                    );
                }
            }
        }
        DailyShapeRatioCurve::new(tree.relative_price_map()?)
    }
}

fn span_of(periods: &ShapedRangeSet) -> CurveResult<(helios_core::types::Date, helios_core::types::Date)> {
    let start = periods.iter().map(|p| p.start()).min();
    let end = periods.iter().map(|p| p.end()).max();
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(CurveError::shape_calibration(
            "cannot shape an empty period set",
        )),
    }
}

/// Season-based calibration: Summer/Winter to quarter to month to
/// weekday/weekend shaping.
#[derive(Debug)]
pub struct SeasonShapeCalibration {
    tables: RatioTables,
    cache: RwLock<HashMap<LoadShapedDateRange, Arc<DailyShapeRatioCurve>>>,
}

impl SeasonShapeCalibration {
    /// Creates the calibration from ratio tables.
    ///
    /// `season_to_quarter` is indexed by calendar quarter (Q1 and Q4 apply
    /// within Winter, Q2 and Q3 within Summer); `quarter_to_month` by
    /// calendar month.
    ///
    /// # Errors
    ///
    /// `ShapeCalibration` when the tables are inconsistent.
    pub fn new(
        season_to_quarter: HashMap<LoadShape, [f64; 4]>,
        quarter_to_month: HashMap<LoadShape, [f64; 12]>,
        within_month: Vec<(LoadShape, f64)>,
    ) -> CurveResult<Self> {
        Ok(Self {
            tables: RatioTables::new(season_to_quarter, quarter_to_month, within_month)?,
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn covering_period(&self, periods: &ShapedRangeSet) -> CurveResult<LoadShapedDateRange> {
        let (start, end) = span_of(periods)?;
        let season = match DateRange::containing(start, RangeType::Summer) {
            Ok(season) => season,
            Err(HeliosError::DateOutOfSeason { .. }) => {
                DateRange::containing(start, RangeType::Winter)?
            }
            Err(err) => return Err(err.into()),
        };
        if !season.contains_date(end) {
            return Err(CurveError::shape_calibration(
                "shape information does not cover the period being priced",
            ));
        }
        let shape = self.tables.covering_shape(periods)?;
        Ok(LoadShapedDateRange::new(season, shape))
    }
}

impl DailyShapeCalibration for SeasonShapeCalibration {
    fn shape_ratio_curve(&self, periods: &ShapedRangeSet) -> CurveResult<Arc<DailyShapeRatioCurve>> {
        let period = self.covering_period(periods)?;
        if let Some(curve) = self.cache.read().get(&period) {
            return Ok(Arc::clone(curve));
        }
        let curve = Arc::new(self.tables.build_curve(period)?);
        Ok(Arc::clone(
            self.cache.write().entry(period).or_insert(curve),
        ))
    }
}

/// Calendar-based calibration: year to quarter to month to
/// weekday/weekend shaping.
#[derive(Debug)]
pub struct CalendarShapeCalibration {
    tables: RatioTables,
    cache: RwLock<HashMap<LoadShapedDateRange, Arc<DailyShapeRatioCurve>>>,
}

impl CalendarShapeCalibration {
    /// Creates the calibration from ratio tables indexed by calendar
    /// quarter and calendar month.
    ///
    /// # Errors
    ///
    /// `ShapeCalibration` when the tables are inconsistent.
    pub fn new(
        year_to_quarter: HashMap<LoadShape, [f64; 4]>,
        quarter_to_month: HashMap<LoadShape, [f64; 12]>,
        within_month: Vec<(LoadShape, f64)>,
    ) -> CurveResult<Self> {
        Ok(Self {
            tables: RatioTables::new(year_to_quarter, quarter_to_month, within_month)?,
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn covering_period(&self, periods: &ShapedRangeSet) -> CurveResult<LoadShapedDateRange> {
        let (start, end) = span_of(periods)?;
        let year = DateRange::containing(start, RangeType::Year)?;
        if !year.contains_date(end) {
            return Err(CurveError::shape_calibration(
                "shape information does not cover the period being priced",
            ));
        }
        let shape = self.tables.covering_shape(periods)?;
        Ok(LoadShapedDateRange::new(year, shape))
    }
}

impl DailyShapeCalibration for CalendarShapeCalibration {
    fn shape_ratio_curve(&self, periods: &ShapedRangeSet) -> CurveResult<Arc<DailyShapeRatioCurve>> {
        let period = self.covering_period(periods)?;
        if let Some(curve) = self.cache.read().get(&period) {
            return Ok(Arc::clone(curve));
        }
        let curve = Arc::new(self.tables.build_curve(period)?);
        Ok(Arc::clone(
            self.cache.write().entry(period).or_insert(curve),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use helios_core::periods::{BASE, PEAK, WEEKDAY, WEEKEND};

    fn base(range: &str) -> LoadShapedDateRange {
        LoadShapedDateRange::new(range.parse::<DateRange>().unwrap(), BASE)
    }

    fn flat_calibration() -> SeasonShapeCalibration {
        let mut s_to_q = HashMap::new();
        s_to_q.insert(BASE, [1.1, 0.9, 1.0, 1.0]);
        let mut q_to_m = HashMap::new();
        q_to_m.insert(BASE, [1.2, 1.2, 0.6, 1.1, 1.0, 0.9, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        SeasonShapeCalibration::new(s_to_q, q_to_m, vec![(WEEKDAY, 1.0), (WEEKEND, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_mismatched_tables_rejected() {
        let mut s_to_q = HashMap::new();
        s_to_q.insert(BASE, [1.0; 4]);
        let mut q_to_m = HashMap::new();
        q_to_m.insert(PEAK, [1.0; 12]);
        assert!(SeasonShapeCalibration::new(s_to_q, q_to_m, vec![(WEEKDAY, 1.0)]).is_err());
    }

    #[test]
    fn test_covering_period_picks_season() {
        let calibration = flat_calibration();
        // January sits in the Winter starting the previous October
        let winter = calibration
            .covering_period(&ShapedRangeSet::new([base("2011-M1")]))
            .unwrap();
        assert_eq!(winter.date_range(), "2010-WIN".parse::<DateRange>().unwrap());
        // May sits in Summer
        let summer = calibration
            .covering_period(&ShapedRangeSet::new([base("2011-M5")]))
            .unwrap();
        assert_eq!(summer.date_range(), "2011-SUM".parse::<DateRange>().unwrap());
        // a set spanning two seasons is not coverable
        assert!(calibration
            .covering_period(&ShapedRangeSet::new([base("2011")]))
            .is_err());
    }

    #[test]
    fn test_quarter_ratios_within_season() {
        let calibration = flat_calibration();
        let curve = calibration
            .shape_ratio_curve(&ShapedRangeSet::new([base("2011-Q2")]))
            .unwrap();
        let q2 = curve.price(&base("2011-Q2")).unwrap();
        let q3 = curve.price(&base("2011-Q3")).unwrap();
        assert_relative_eq!(q2 / q3, 0.9, epsilon = 1e-10);
        // the whole season prices at 1
        assert_relative_eq!(curve.price(&base("2011-SUM")).unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_month_ratios_within_quarter() {
        let calibration = flat_calibration();
        let curve = calibration
            .shape_ratio_curve(&ShapedRangeSet::new([base("2011-Q1")]))
            .unwrap();
        let months = base("2011-Q1").split_by_month().unwrap();
        let jan = curve.price(&months[0]).unwrap();
        let mar = curve.price(&months[2]).unwrap();
        assert_relative_eq!(jan / mar, 1.2 / 0.6, epsilon = 1e-10);
    }

    #[test]
    fn test_curve_memoized_per_period() {
        let calibration = flat_calibration();
        let set = ShapedRangeSet::new([base("2011-Q2")]);
        let first = calibration.shape_ratio_curve(&set).unwrap();
        let second = calibration.shape_ratio_curve(&set).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_calendar_calibration_covers_year() {
        let mut y_to_q = HashMap::new();
        y_to_q.insert(BASE, [1.1, 0.9, 0.9, 1.1]);
        let mut q_to_m = HashMap::new();
        q_to_m.insert(BASE, [1.0; 12]);
        let calibration =
            CalendarShapeCalibration::new(y_to_q, q_to_m, vec![(WEEKDAY, 1.0), (WEEKEND, 1.0)])
                .unwrap();
        let curve = calibration
            .shape_ratio_curve(&ShapedRangeSet::new([base("2016")]))
            .unwrap();
        assert_relative_eq!(curve.price(&base("2016")).unwrap(), 1.0, epsilon = 1e-10);
        let q1 = curve.price(&base("2016-Q1")).unwrap();
        let q2 = curve.price(&base("2016-Q2")).unwrap();
        assert_relative_eq!(q1 / q2, 1.1 / 0.9, epsilon = 1e-10);
    }
}
