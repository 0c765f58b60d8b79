//! Foundational value types: dates and unit-bearing quantities.

mod date;
mod quantity;

pub use date::{weekday_count, Date, END_OF_WORLD, START_OF_WORLD};
pub use quantity::{
    Quantity, Unit, DIMENSIONLESS, EUR_PER_MWH, GBP_PER_MWH, GBP_PER_THERM, PENCE_PER_THERM,
};
