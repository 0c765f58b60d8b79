//! Opaque unit-bearing numeric type.
//!
//! Quotes and curve prices carry a [`Unit`]; the curve engine itself only
//! needs conversion between compatible units and basic arithmetic, so the
//! dimensional model is deliberately small: a unit has a symbol, a dimension
//! tag and a scale to the dimension's base unit.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul};

use crate::error::{HeliosError, HeliosResult};

/// A price unit: symbol, dimension and scale to the dimension's base unit.
///
/// Two units are convertible iff they share a dimension; conversion
/// multiplies by the ratio of scales. Serialized as the display symbol;
/// deserialization looks the symbol up in the known-unit table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Display symbol, e.g. `p/th`.
    pub symbol: &'static str,
    /// Dimension tag; units convert only within a dimension.
    pub dimension: &'static str,
    /// Multiplier taking one of this unit into the dimension's base unit.
    pub scale: f64,
}

/// Dimensionless unit, used by shape-ratio curves (price ≡ 1 unshaped).
pub const DIMENSIONLESS: Unit = Unit {
    symbol: "",
    dimension: "1",
    scale: 1.0,
};

/// Pence per therm (base unit of the gas price dimension).
pub const PENCE_PER_THERM: Unit = Unit {
    symbol: "p/th",
    dimension: "GBP/therm",
    scale: 1.0,
};

/// Pounds per therm.
pub const GBP_PER_THERM: Unit = Unit {
    symbol: "GBP/th",
    dimension: "GBP/therm",
    scale: 100.0,
};

/// Pounds per megawatt-hour (base unit of the GBP power price dimension).
pub const GBP_PER_MWH: Unit = Unit {
    symbol: "GBP/MWh",
    dimension: "GBP/MWh",
    scale: 1.0,
};

/// Euros per megawatt-hour.
pub const EUR_PER_MWH: Unit = Unit {
    symbol: "EUR/MWh",
    dimension: "EUR/MWh",
    scale: 1.0,
};

/// Units recognised by [`Unit::from_symbol`] and deserialization.
const KNOWN_UNITS: [Unit; 5] = [
    DIMENSIONLESS,
    PENCE_PER_THERM,
    GBP_PER_THERM,
    GBP_PER_MWH,
    EUR_PER_MWH,
];

impl Unit {
    /// Looks a unit up by its display symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        KNOWN_UNITS.iter().find(|u| u.symbol == symbol).copied()
    }

    /// Whether a value in this unit can be converted into `other`.
    #[must_use]
    pub fn compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Converts a value expressed in this unit into `target`.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::IncompatibleUnits` across dimensions.
    pub fn convert(&self, value: f64, target: &Unit) -> HeliosResult<f64> {
        if !self.compatible(target) {
            return Err(HeliosError::IncompatibleUnits {
                left: self.symbol.to_string(),
                right: target.symbol.to_string(),
            });
        }
        Ok(value * self.scale / target.scale)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

impl Serialize for Unit {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Unit::from_symbol(&symbol)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown unit symbol `{symbol}`")))
    }
}

/// A number tagged with a [`Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Numeric value in `unit`.
    pub value: f64,
    /// The unit the value is expressed in.
    pub unit: Unit,
}

impl Quantity {
    /// Creates a quantity.
    #[must_use]
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Re-expresses the quantity in `target`.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::IncompatibleUnits` across dimensions.
    pub fn convert(&self, target: Unit) -> HeliosResult<Self> {
        Ok(Self {
            value: self.unit.convert(self.value, &target)?,
            unit: target,
        })
    }

    /// Adds two quantities, converting `other` into this quantity's unit.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::IncompatibleUnits` across dimensions.
    pub fn add(&self, other: &Quantity) -> HeliosResult<Self> {
        let rhs = other.convert(self.unit)?;
        Ok(Self::new(self.value + rhs.value, self.unit))
    }

    /// Subtracts `other`, converting it into this quantity's unit.
    ///
    /// # Errors
    ///
    /// Returns `HeliosError::IncompatibleUnits` across dimensions.
    pub fn sub(&self, other: &Quantity) -> HeliosResult<Self> {
        let rhs = other.convert(self.unit)?;
        Ok(Self::new(self.value - rhs.value, self.unit))
    }
}

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(self.value * rhs, self.unit)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        Quantity::new(self.value / rhs, self.unit)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let rhs = other.convert(self.unit).ok()?;
        self.value.partial_cmp(&rhs.value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit)
        }
    }
}
