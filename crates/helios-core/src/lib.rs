//! # Helios Core
//!
//! Core delivery-period types for the Helios commodity forward-curve
//! library.
//!
//! This crate provides the foundational building blocks used throughout
//! Helios:
//!
//! - **Types**: Domain-specific types like `Date`, `Quantity`, `Unit`
//! - **Calendar Range Types**: Day through gas-year delivery conventions,
//!   with parse/format round-tripping
//! - **Load Shapes**: 48-bit hours-of-week delivery patterns
//! - **Period Sets**: homogeneous period collections and the partition
//!   into disjoint equivalence classes that curve bootstrapping rests on
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: Newtypes prevent mixing incompatible values
//! - **Immutability**: every period value is `Copy` or cheaply cloned and
//!   never mutated after construction
//! - **Explicit Over Implicit**: Clear, self-documenting APIs
//!
//! ## Example
//!
//! ```rust
//! use helios_core::prelude::*;
//!
//! let quarter: DateRange = "2016-Q2".parse().unwrap();
//! let peak = LoadShapedDateRange::new(quarter, PEAK);
//! assert!(peak.duration() > 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::if_not_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_self)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::cast_possible_truncation)]

pub mod error;
pub mod periods;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{HeliosError, HeliosResult};
    pub use crate::periods::{
        DateRange, DateRangeSet, LoadShape, LoadShapeSet, LoadShapedDateRange, RangeType,
        ShapedRangeSet, TimePeriodSet, BASE, OFFPEAK, PEAK, WEEKDAY, WEEKEND,
    };
    pub use crate::types::{Date, Quantity, Unit};
}

// Re-export commonly used types at crate root
pub use error::{HeliosError, HeliosResult};
pub use periods::{DateRange, LoadShape, LoadShapedDateRange, RangeType, TimePeriodSet};
pub use types::{Date, Quantity, Unit};
