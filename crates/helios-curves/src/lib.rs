//! # Helios Curves
//!
//! Forward-curve bootstrapping and shape calibration for the Helios
//! commodity analytics library.
//!
//! This crate provides:
//!
//! - **Curve Trait**: Core [`ForwardPriceCurve`] trait for pricing any
//!   delivery period
//! - **Bootstrap**: Square linear solve from overlapping period quotes
//! - **Settlement**: Market settlement conventions and discounting
//! - **Shape**: Daily and intraday shape calibration via ratio trees
//! - **Decorators**: Multiplicative shifts over a delivery period
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use helios_curves::prelude::*;
//! use std::sync::Arc;
//!
//! // Quote overlapping delivery periods
//! let quotes = Quotes::new(
//!     [
//!         ("2012-Q4".parse::<DateRange>()?, 9.0),
//!         ("2012-M12".parse::<DateRange>()?, 12.0),
//!     ],
//!     SettlementRule::Gas,
//!     Some(PENCE_PER_THERM),
//! )?;
//!
//! // Bootstrap and price any sub-period
//! let curve = CommodityForwardCurve::new(
//!     &quotes,
//!     Arc::new(NullDiscountCurve),
//!     ShapeAlgorithm::unshaped(),
//! )?;
//! let november = curve.price("2012-M11".parse::<DateRange>()?)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]

pub mod bootstrap;
pub mod discount;
pub mod error;
pub mod forward;
pub mod quotes;
pub mod settlement;
pub mod shape;
pub mod shifted;

/// Coverage tolerance for period pricing: one second, measured in days.
pub const DAY_TOLERANCE: f64 = 1.0 / 86_400.0;

pub use error::{CurveError, CurveResult};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bootstrap::bootstrap_atom_prices;
    pub use crate::discount::{DiscountCurve, FlatDiscountCurve, NullDiscountCurve};
    pub use crate::error::{CurveError, CurveResult};
    pub use crate::forward::{CommodityForwardCurve, ForwardPriceCurve};
    pub use crate::quotes::{QuoteValue, Quotes};
    pub use crate::settlement::SettlementRule;
    pub use crate::shape::{
        CalendarShapeCalibration, DailyShapeCalibration, DailyShapeRatioCurve,
        IntradayShapeCalibration, RatioCurve, SeasonShapeCalibration, ShapeAlgorithm,
        ShapeRatioTree, UnshapedRatioCurve,
    };
    pub use crate::shifted::ShiftedForwardCurve;
    pub use crate::DAY_TOLERANCE;
    pub use helios_core::prelude::*;
}
