//! Delivery periods: calendar range types, date ranges, load shapes, and
//! the partition primitive over sets of them.

mod date_range;
mod load_shape;
mod period_set;
mod range_type;
mod shaped_range;

pub use date_range::{date_ranges, DateRange, ALWAYS_DR, NEVER_DR};
pub use load_shape::{
    partition_load_shapes, LoadShape, BASE, DAYTIME, EXTENDED_DAYTIME, EXTENDED_PEAK, NEVER_LS,
    NIGHTTIME, OFFPEAK, PEAK, WEEKDAY, WEEKDAY_OFFPEAK, WEEKEND, WEEKEND_EXTENDED_PEAK,
    WEEKEND_OFFPEAK, WEEKEND_PEAK,
};
pub use period_set::{DateRangeSet, LoadShapeSet, ShapedRangeSet, TimePeriodSet};
pub use range_type::{RangeType, ALL_RANGE_TYPES};
pub use shaped_range::{LoadShapedDateRange, NEVER_LSDR};
