//! Error types for the Helios core library.
//!
//! This module defines the error types used by the delivery-period value
//! types, providing structured error handling with context.

use thiserror::Error;

/// A specialized Result type for Helios core operations.
pub type HeliosResult<T> = Result<T, HeliosError>;

/// The main error type for Helios core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeliosError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Text could not be parsed into the expected period or shape.
    #[error("Cannot parse {input:?}: {expected}")]
    Parse {
        /// The offending input text.
        input: String,
        /// What the parser expected.
        expected: String,
    },

    /// A date fell outside the calendar range type probed for it.
    #[error("Date {date} is not in {range_type}")]
    DateOutOfSeason {
        /// The probed date, formatted.
        date: String,
        /// The range type that rejected it.
        range_type: String,
    },

    /// Operation attempted across heterogeneous period types.
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// The period type the operation required.
        expected: String,
        /// The period type actually supplied.
        got: String,
    },

    /// Units belong to different dimensions and cannot be converted.
    #[error("Incompatible units: {left} vs {right}")]
    IncompatibleUnits {
        /// Left-hand unit symbol.
        left: String,
        /// Right-hand unit symbol.
        right: String,
    },

    /// A collection of values mixes unit-bearing and bare numbers, or
    /// carries no unit information at all.
    #[error("Ambiguous units: {reason}")]
    AmbiguousUnits {
        /// Description of the ambiguity.
        reason: String,
    },
}

impl HeliosError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            expected: expected.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Creates an ambiguous units error.
    #[must_use]
    pub fn ambiguous_units(reason: impl Into<String>) -> Self {
        Self::AmbiguousUnits {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeliosError::invalid_date("2024-02-30 is not a valid date");
        assert!(err.to_string().contains("Invalid date"));

        let err = HeliosError::parse("2016-x3", "'YYYY-Qn' or similar");
        assert!(err.to_string().contains("2016-x3"));
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = HeliosError::type_mismatch("DateRange", "LoadShape");
        assert!(err.to_string().contains("expected DateRange"));
    }
}
