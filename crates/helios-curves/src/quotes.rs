//! Validated market quotes for curve construction.

use helios_core::periods::{LoadShapedDateRange, ShapedRangeSet};
use helios_core::types::{Quantity, Unit};
use helios_core::HeliosError;

use crate::error::{CurveError, CurveResult};
use crate::settlement::SettlementRule;

/// A quoted price: either a bare number (unit supplied separately) or a
/// unit-bearing quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteValue {
    /// A number with no unit of its own.
    Bare(f64),
    /// A unit-bearing quantity.
    Amount(Quantity),
}

impl From<f64> for QuoteValue {
    fn from(value: f64) -> Self {
        QuoteValue::Bare(value)
    }
}

impl From<Quantity> for QuoteValue {
    fn from(value: Quantity) -> Self {
        QuoteValue::Amount(value)
    }
}

/// A validated set of period quotes sharing one unit and one settlement
/// convention.
///
/// Construction enforces the quoting contract: the map must be non-empty;
/// values are either all bare numbers (requiring an explicit unit) or all
/// quantities (unit inferred from the first quote, or converted to the
/// supplied one); quantity units must be convertible into the common unit.
///
/// Period keys are anything convertible into a [`LoadShapedDateRange`];
/// plain date ranges promote to BASE-shaped delivery.
#[derive(Debug, Clone)]
pub struct Quotes {
    prices: Vec<(LoadShapedDateRange, f64)>,
    unit: Unit,
    settlement_rule: SettlementRule,
}

impl Quotes {
    /// Validates and normalizes a quote map.
    ///
    /// # Errors
    ///
    /// `MissingPrice` for an empty map, `AmbiguousUnits` for mixed
    /// bare/quantity values or bare values without a unit,
    /// `IncompatibleUnits` when a quantity cannot convert to the common
    /// unit.
    pub fn new<P, V, I>(
        quotes: I,
        settlement_rule: SettlementRule,
        unit: Option<Unit>,
    ) -> CurveResult<Self>
    where
        P: Into<LoadShapedDateRange>,
        V: Into<QuoteValue>,
        I: IntoIterator<Item = (P, V)>,
    {
        let raw: Vec<(LoadShapedDateRange, QuoteValue)> = quotes
            .into_iter()
            .map(|(p, v)| (p.into(), v.into()))
            .collect();
        if raw.is_empty() {
            return Err(CurveError::missing_price("<empty>", "no quotes supplied"));
        }
        let quantity_count = raw
            .iter()
            .filter(|(_, v)| matches!(v, QuoteValue::Amount(_)))
            .count();
        if quantity_count != 0 && quantity_count != raw.len() {
            return Err(HeliosError::ambiguous_units(
                "quotes mix unit-bearing quantities and bare numbers",
            )
            .into());
        }

        let (unit, prices) = if quantity_count == 0 {
            let unit = unit.ok_or_else(|| {
                HeliosError::ambiguous_units("quotes carry no units and no unit was supplied")
            })?;
            let prices = raw
                .into_iter()
                .map(|(p, v)| match v {
                    QuoteValue::Bare(x) => (p, x),
                    QuoteValue::Amount(_) => unreachable!(),
                })
                .collect();
            (unit, prices)
        } else {
            let target = match unit {
                Some(u) => u,
                None => match raw[0].1 {
                    QuoteValue::Amount(q) => q.unit,
                    QuoteValue::Bare(_) => unreachable!(),
                },
            };
            let prices = raw
                .into_iter()
                .map(|(p, v)| match v {
                    QuoteValue::Amount(q) => Ok((p, q.convert(target)?.value)),
                    QuoteValue::Bare(_) => unreachable!(),
                })
                .collect::<Result<Vec<_>, HeliosError>>()?;
            (target, prices)
        };

        Ok(Self {
            prices,
            unit,
            settlement_rule,
        })
    }

    /// The quoted periods as a set.
    #[must_use]
    pub fn periods(&self) -> ShapedRangeSet {
        ShapedRangeSet::new(self.prices.iter().map(|(p, _)| *p))
    }

    /// The quoted `(period, price)` pairs, prices in [`Quotes::unit`].
    #[must_use]
    pub fn prices(&self) -> &[(LoadShapedDateRange, f64)] {
        &self.prices
    }

    /// The common quote unit.
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The settlement convention the quotes trade under.
    #[must_use]
    pub fn settlement_rule(&self) -> SettlementRule {
        self.settlement_rule
    }

    /// Number of quotes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the quote set is empty (never true after validation).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use helios_core::periods::{DateRange, BASE, PEAK};
    use helios_core::types::{GBP_PER_MWH, GBP_PER_THERM, PENCE_PER_THERM};

    fn dr(s: &str) -> DateRange {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        let quotes: Vec<(DateRange, f64)> = Vec::new();
        let err = Quotes::new(quotes, SettlementRule::Gas, Some(PENCE_PER_THERM)).unwrap_err();
        assert!(matches!(err, CurveError::MissingPrice { .. }));
    }

    #[test]
    fn test_bare_numbers_need_unit() {
        let err = Quotes::new([(dr("2012-Q4"), 9.0)], SettlementRule::Gas, None).unwrap_err();
        assert!(matches!(
            err,
            CurveError::Core(HeliosError::AmbiguousUnits { .. })
        ));
        let quotes = Quotes::new(
            [(dr("2012-Q4"), 9.0)],
            SettlementRule::Gas,
            Some(PENCE_PER_THERM),
        )
        .unwrap();
        assert_eq!(quotes.unit(), PENCE_PER_THERM);
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn test_mixed_forms_rejected() {
        let err = Quotes::new(
            [
                (dr("2012-Q4"), QuoteValue::Bare(9.0)),
                (
                    dr("2012-M12"),
                    QuoteValue::Amount(Quantity::new(12.0, PENCE_PER_THERM)),
                ),
            ],
            SettlementRule::Gas,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CurveError::Core(HeliosError::AmbiguousUnits { .. })
        ));
    }

    #[test]
    fn test_quantities_convert_to_common_unit() {
        let quotes = Quotes::new(
            [
                (dr("2012-Q4"), Quantity::new(9.0, PENCE_PER_THERM)),
                (dr("2012-M12"), Quantity::new(0.12, GBP_PER_THERM)),
            ],
            SettlementRule::Gas,
            None,
        )
        .unwrap();
        // unit inferred from the first quote, second converted
        assert_eq!(quotes.unit(), PENCE_PER_THERM);
        let december = quotes
            .prices()
            .iter()
            .find(|(p, _)| p.date_range() == dr("2012-M12"))
            .unwrap();
        assert_relative_eq!(december.1, 12.0);
    }

    #[test]
    fn test_incompatible_units_rejected() {
        let err = Quotes::new(
            [
                (dr("2012-Q4"), Quantity::new(9.0, PENCE_PER_THERM)),
                (dr("2012-M12"), Quantity::new(90.0, GBP_PER_MWH)),
            ],
            SettlementRule::Gas,
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CurveError::Core(HeliosError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_shaped_keys() {
        let quotes = Quotes::new(
            [
                (LoadShapedDateRange::new(dr("2012-M12"), BASE), 90.0),
                (LoadShapedDateRange::new(dr("2012-M12"), PEAK), 120.0),
            ],
            SettlementRule::UkPower,
            Some(GBP_PER_MWH),
        )
        .unwrap();
        assert_eq!(quotes.periods().len(), 2);
    }
}
