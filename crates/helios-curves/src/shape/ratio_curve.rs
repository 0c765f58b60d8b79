//! Shape-ratio curves: forward curves whose unshaped price is 1.

use std::collections::HashMap;

use helios_core::periods::{LoadShapedDateRange, ShapedRangeSet};
use parking_lot::RwLock;

use crate::bootstrap::bootstrap_atom_prices;
use crate::error::{CurveError, CurveResult};
use crate::DAY_TOLERANCE;

/// A source of relative (dimensionless) prices for delivery periods.
///
/// Implementations carry only shaping information: pricing any period off a
/// flat underlying curve must reproduce the calibration ratios.
pub trait RatioCurve: Send + Sync {
    /// The relative price of `period`.
    ///
    /// # Errors
    ///
    /// `MissingPrice` when the curve does not span the period.
    fn ratio_price(&self, period: &LoadShapedDateRange) -> CurveResult<f64>;
}

/// The trivial ratio curve: every period prices at 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnshapedRatioCurve;

impl RatioCurve for UnshapedRatioCurve {
    fn ratio_price(&self, _period: &LoadShapedDateRange) -> CurveResult<f64> {
        Ok(1.0)
    }
}

/// A bootstrapped ratio curve over plain (undiscounted) durations.
///
/// Built from a relative-price map, typically the leaves of a calibration
/// tree. Queries are memoized per period, written at most once per key.
#[derive(Debug)]
pub struct DailyShapeRatioCurve {
    atom_prices: Vec<(ShapedRangeSet, f64)>,
    cache: RwLock<HashMap<LoadShapedDateRange, f64>>,
}

impl DailyShapeRatioCurve {
    /// Bootstraps the curve from `(period, relative price)` pairs.
    ///
    /// # Errors
    ///
    /// Propagates [`bootstrap_atom_prices`] failures.
    pub fn new(relative_prices: Vec<(LoadShapedDateRange, f64)>) -> CurveResult<Self> {
        let atom_prices = bootstrap_atom_prices(&relative_prices, |p| Ok(p.duration()))?;
        Ok(Self {
            atom_prices,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// The relative price of `period`, duration-weighted over the atoms it
    /// touches.
    ///
    /// # Errors
    ///
    /// `MissingPrice` when the atoms do not cover the period to within one
    /// second of a day.
    pub fn price(&self, period: &LoadShapedDateRange) -> CurveResult<f64> {
        if let Some(cached) = self.cache.read().get(period) {
            return Ok(*cached);
        }
        let price = self.compute_price(period)?;
        self.cache.write().entry(*period).or_insert(price);
        Ok(price)
    }

    fn compute_price(&self, period: &LoadShapedDateRange) -> CurveResult<f64> {
        let mut value = 0.0;
        let mut time = 0.0;
        for (class, price) in &self.atom_prices {
            if !class.intersects(period) {
                continue;
            }
            let intersection = class.intersection(period);
            let t = intersection.duration();
            if t > 0.0 {
                value += price * t;
                time += t;
            }
        }
        let required = period.duration();
        if (time - required).abs() > DAY_TOLERANCE || time <= 0.0 {
            return Err(CurveError::missing_price(
                period,
                format!("ratio curve does not span the period (out by {} days)", (time - required).abs()),
            ));
        }
        Ok(value / time)
    }
}

impl RatioCurve for DailyShapeRatioCurve {
    fn ratio_price(&self, period: &LoadShapedDateRange) -> CurveResult<f64> {
        self.price(period)
    }
}
