//! Discount curve collaborators.
//!
//! The forward-curve engine only needs a discount factor per settlement
//! date, so the trait surface is a single method. Real yield-curve
//! construction lives outside this crate.

use helios_core::types::Date;

/// Source of discount factors for settlement-date discounting.
pub trait DiscountCurve: Send + Sync {
    /// The discount factor applying to a cash flow on `date`.
    fn factor(&self, date: Date) -> f64;
}

/// A discount curve that never discounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiscountCurve;

impl DiscountCurve for NullDiscountCurve {
    fn factor(&self, _date: Date) -> f64 {
        1.0
    }
}

/// Continuously compounded flat discounting from an anchor date.
///
/// Dates before the anchor carry factor 1.
#[derive(Debug, Clone, Copy)]
pub struct FlatDiscountCurve {
    anchor: Date,
    rate: f64,
}

impl FlatDiscountCurve {
    /// Creates a flat curve with annual rate `rate` anchored at `anchor`.
    #[must_use]
    pub fn new(anchor: Date, rate: f64) -> Self {
        Self { anchor, rate }
    }
}

impl DiscountCurve for FlatDiscountCurve {
    fn factor(&self, date: Date) -> f64 {
        let days = date - self.anchor;
        if days <= 0 {
            1.0
        } else {
            (-self.rate * days as f64 / 365.0).exp()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_curve() {
        let curve = NullDiscountCurve;
        assert_relative_eq!(curve.factor(Date::from_ymd(2030, 1, 1).unwrap()), 1.0);
    }

    #[test]
    fn test_flat_curve() {
        let anchor = Date::from_ymd(2016, 1, 1).unwrap();
        let curve = FlatDiscountCurve::new(anchor, 0.05);
        assert_relative_eq!(curve.factor(anchor), 1.0);
        assert_relative_eq!(curve.factor(anchor - 30), 1.0);
        let one_year = curve.factor(Date::from_ymd(2017, 1, 1).unwrap());
        assert_relative_eq!(one_year, (-0.05f64 * 366.0 / 365.0).exp());
        assert!(one_year < 1.0);
    }
}
