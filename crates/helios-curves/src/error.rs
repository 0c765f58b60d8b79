//! Error types for curve operations.
//!
//! This module provides structured error handling for quote validation,
//! curve bootstrapping, shape calibration, and price queries.

use helios_core::HeliosError;
use thiserror::Error;

/// A specialized Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Error types for curve operations.
#[derive(Error, Debug, Clone)]
pub enum CurveError {
    /// The curve does not span the requested delivery period.
    #[error("Missing price for {period}: {detail}")]
    MissingPrice {
        /// The requested period, formatted.
        period: String,
        /// Why the price could not be produced.
        detail: String,
    },

    /// The quote set does not partition into one atom per quote, so the
    /// bootstrap system cannot be square.
    #[error("Bootstrap system is not square: {quotes} quotes over {atoms} atoms")]
    NonSquareSystem {
        /// Number of quoted periods.
        quotes: usize,
        /// Number of partition classes.
        atoms: usize,
    },

    /// The bootstrap matrix is singular.
    #[error("Bootstrap system of size {size} is singular")]
    SingularSystem {
        /// Dimension of the square system.
        size: usize,
    },

    /// Shape calibration data does not cover the requested period.
    #[error("Shape calibration error: {reason}")]
    ShapeCalibration {
        /// What went wrong.
        reason: String,
    },

    /// An error from the core period types.
    #[error(transparent)]
    Core(#[from] HeliosError),
}

impl CurveError {
    /// Creates a `MissingPrice` error.
    pub fn missing_price(period: impl std::fmt::Display, detail: impl Into<String>) -> Self {
        Self::MissingPrice {
            period: period.to_string(),
            detail: detail.into(),
        }
    }

    /// Creates a `ShapeCalibration` error.
    pub fn shape_calibration(reason: impl Into<String>) -> Self {
        Self::ShapeCalibration {
            reason: reason.into(),
        }
    }
}
