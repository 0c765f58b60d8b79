//! Commodity forward curves bootstrapped from market quotes.

use std::collections::HashMap;
use std::sync::Arc;

use helios_core::periods::{LoadShapedDateRange, ShapedRangeSet};
use helios_core::types::{Quantity, Unit};
use parking_lot::RwLock;

use crate::bootstrap::bootstrap_atom_prices;
use crate::discount::DiscountCurve;
use crate::error::{CurveError, CurveResult};
use crate::quotes::Quotes;
use crate::settlement::SettlementRule;
use crate::shape::ShapeAlgorithm;
use crate::shifted::ShiftedForwardCurve;
use crate::DAY_TOLERANCE;

/// A curve pricing any delivery period in a fixed unit.
pub trait ForwardPriceCurve: Send + Sync {
    /// The unit prices are quoted in.
    fn unit(&self) -> Unit;

    /// The forward price of `period`.
    ///
    /// # Errors
    ///
    /// `MissingPrice` when the curve does not span the period.
    fn price<P>(&self, period: P) -> CurveResult<Quantity>
    where
        P: Into<LoadShapedDateRange>,
        Self: Sized,
    {
        self.price_period(&period.into())
    }

    /// The forward price of an already-promoted period.
    ///
    /// # Errors
    ///
    /// `MissingPrice` when the curve does not span the period.
    fn price_period(&self, period: &LoadShapedDateRange) -> CurveResult<Quantity>;

    /// Decorates this curve with a multiplicative shift over `period`.
    fn shifted<P>(self, period: P, factor: f64) -> ShiftedForwardCurve<Self>
    where
        P: Into<LoadShapedDateRange>,
        Self: Sized,
    {
        ShiftedForwardCurve::new(self, period.into(), factor)
    }
}

/// A forward curve bootstrapped from overlapping period quotes.
///
/// Construction partitions the quoted periods into disjoint atom classes
/// and solves the square linear system relating quoted prices to atom
/// prices under the quotes' settlement convention and the supplied
/// discounting. Queries average atom prices over the queried period,
/// applying the shape algorithm within each class, and are memoized per
/// period with each cache slot written at most once.
pub struct CommodityForwardCurve {
    atom_prices: Vec<(ShapedRangeSet, f64)>,
    settlement_rule: SettlementRule,
    discount_curve: Arc<dyn DiscountCurve>,
    shape: ShapeAlgorithm,
    unit: Unit,
    cache: RwLock<HashMap<LoadShapedDateRange, f64>>,
}

impl CommodityForwardCurve {
    /// Bootstraps the curve from validated quotes.
    ///
    /// # Errors
    ///
    /// `NonSquareSystem` when the quoted periods do not partition into as
    /// many classes as there are quotes, `SingularSystem` when the solve
    /// fails.
    pub fn new(
        quotes: &Quotes,
        discount_curve: Arc<dyn DiscountCurve>,
        shape: ShapeAlgorithm,
    ) -> CurveResult<Self> {
        let rule = quotes.settlement_rule();
        let atom_prices = bootstrap_atom_prices(quotes.prices(), |period| {
            rule.discounted_duration(period, discount_curve.as_ref())
        })?;
        Ok(Self {
            atom_prices,
            settlement_rule: rule,
            discount_curve,
            shape,
            unit: quotes.unit(),
            cache: RwLock::new(HashMap::new()),
        })
    }

    fn discounted_duration(&self, periods: &ShapedRangeSet) -> CurveResult<f64> {
        let mut total = 0.0;
        for period in periods.iter() {
            total += self
                .settlement_rule
                .discounted_duration(period, self.discount_curve.as_ref())?;
        }
        Ok(total)
    }

    fn compute_price(&self, period: &LoadShapedDateRange) -> CurveResult<f64> {
        let mut value = 0.0;
        let mut time = 0.0;
        for (class, atom_price) in &self.atom_prices {
            if !class.intersects(period) {
                continue;
            }
            let within = class.intersection(period);
            let t = self.discounted_duration(&within)?;
            if t <= 0.0 {
                continue;
            }
            let ratio = self.shape.shape_ratio(&within, class)?;
            value += atom_price * ratio * t;
            time += t;
        }
        let required = self
            .settlement_rule
            .discounted_duration(period, self.discount_curve.as_ref())?;
        if (time - required).abs() > DAY_TOLERANCE || time <= 0.0 {
            return Err(CurveError::missing_price(
                period,
                "the quoted periods do not span the period being priced",
            ));
        }
        Ok(value / time)
    }
}

impl ForwardPriceCurve for CommodityForwardCurve {
    fn unit(&self) -> Unit {
        self.unit
    }

    fn price_period(&self, period: &LoadShapedDateRange) -> CurveResult<Quantity> {
        if let Some(cached) = self.cache.read().get(period) {
            return Ok(Quantity::new(*cached, self.unit));
        }
        let price = self.compute_price(period)?;
        self.cache.write().entry(*period).or_insert(price);
        Ok(Quantity::new(price, self.unit))
    }
}
