//! Multiplicative shift decorator over a forward curve.

use helios_core::periods::LoadShapedDateRange;
use helios_core::types::{Quantity, Unit};

use crate::error::CurveResult;
use crate::forward::ForwardPriceCurve;

/// Scales a base curve by a fixed factor over one delivery period.
///
/// Periods disjoint from the shift period price off the base curve
/// unchanged; periods inside it are scaled; periods straddling the
/// boundary combine the two, weighted by delivered duration. Decorators
/// nest, so repeated shifts compose.
pub struct ShiftedForwardCurve<C> {
    base: C,
    shift_period: LoadShapedDateRange,
    factor: f64,
}

impl<C: ForwardPriceCurve> ShiftedForwardCurve<C> {
    /// Wraps `base`, scaling prices within `shift_period` by `factor`.
    pub fn new(base: C, shift_period: LoadShapedDateRange, factor: f64) -> Self {
        Self {
            base,
            shift_period,
            factor,
        }
    }
}

impl<C: ForwardPriceCurve> ForwardPriceCurve for ShiftedForwardCurve<C> {
    fn unit(&self) -> Unit {
        self.base.unit()
    }

    fn price_period(&self, period: &LoadShapedDateRange) -> CurveResult<Quantity> {
        if !self.shift_period.intersects(period) {
            return self.base.price_period(period);
        }
        if self.shift_period.contains(period) {
            let unscaled = self.base.price_period(period)?;
            return Ok(Quantity::new(unscaled.value * self.factor, unscaled.unit));
        }
        // straddling: scale the overlap, leave the remainder, and weight
        // both by delivered duration
        let overlap = self.shift_period.intersection(period);
        let mut value = self.price_period(&overlap)?.value * overlap.duration();
        let mut time = overlap.duration();
        for piece in period.difference(&self.shift_period) {
            let t = piece.duration();
            if t <= 0.0 {
                continue;
            }
            value += self.base.price_period(&piece)?.value * t;
            time += t;
        }
        Ok(Quantity::new(value / time, self.unit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use helios_core::periods::DateRange;
    use helios_core::types::{Date, PENCE_PER_THERM};
    use std::sync::Arc;

    use crate::discount::NullDiscountCurve;
    use crate::forward::CommodityForwardCurve;
    use crate::quotes::Quotes;
    use crate::settlement::SettlementRule;
    use crate::shape::ShapeAlgorithm;

    fn dr(s: &str) -> DateRange {
        s.parse().unwrap()
    }

    fn quarter_curve() -> CommodityForwardCurve {
        let quotes = Quotes::new(
            [
                (dr("2016-M1"), 70.0),
                (dr("2016-M2"), 60.0),
                (dr("2016-M3"), 55.0),
            ],
            SettlementRule::Gas,
            Some(PENCE_PER_THERM),
        )
        .unwrap();
        CommodityForwardCurve::new(&quotes, Arc::new(NullDiscountCurve), ShapeAlgorithm::unshaped())
            .unwrap()
    }

    #[test]
    fn test_shift_scales_contained_periods() {
        let curve = quarter_curve().shifted(dr("2016-M1"), 1.1);
        assert_relative_eq!(curve.price(dr("2016-M1")).unwrap().value, 77.0, epsilon = 1e-10);
        assert_eq!(curve.unit(), PENCE_PER_THERM);
    }

    #[test]
    fn test_shift_leaves_disjoint_periods() {
        let curve = quarter_curve().shifted(dr("2016-M1"), 1.1);
        assert_relative_eq!(curve.price(dr("2016-M2")).unwrap().value, 60.0, epsilon = 1e-10);
        assert_relative_eq!(curve.price(dr("2016-M3")).unwrap().value, 55.0, epsilon = 1e-10);
    }

    #[test]
    fn test_straddling_period_blends() {
        let curve = quarter_curve().shifted(dr("2016-M1"), 1.1);
        let expected = (31.0 * 77.0 + 29.0 * 60.0 + 31.0 * 55.0) / 91.0;
        assert_relative_eq!(curve.price(dr("2016-Q1")).unwrap().value, expected, epsilon = 1e-10);
        // a partial straddle weights only the delivered days
        let mid = DateRange::new(
            Date::from_ymd(2016, 1, 15).unwrap(),
            Date::from_ymd(2016, 2, 15).unwrap(),
        );
        let expected = (17.0 * 77.0 + 15.0 * 60.0) / 32.0;
        assert_relative_eq!(curve.price(mid).unwrap().value, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_shifts_compose() {
        let curve = quarter_curve()
            .shifted(dr("2016-M1"), 1.1)
            .shifted(dr("2016-M2"), 0.5);
        assert_relative_eq!(curve.price(dr("2016-M1")).unwrap().value, 77.0, epsilon = 1e-10);
        assert_relative_eq!(curve.price(dr("2016-M2")).unwrap().value, 30.0, epsilon = 1e-10);
        assert_relative_eq!(curve.price(dr("2016-M3")).unwrap().value, 55.0, epsilon = 1e-10);
    }
}
