//! Shape calibration: ratio curves, the calibration tree, and the
//! algorithm combining daily and intraday shaping.

mod algorithm;
mod calibration;
mod ratio_curve;
mod tree;

pub use algorithm::{IntradayShapeCalibration, IntradayShapeRatioCurve, ShapeAlgorithm};
pub use calibration::{CalendarShapeCalibration, DailyShapeCalibration, SeasonShapeCalibration};
pub use ratio_curve::{DailyShapeRatioCurve, RatioCurve, UnshapedRatioCurve};
pub use tree::{NodeIndex, ShapeRatioTree};
