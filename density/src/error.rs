//! Error types for density engine operations.
//!
//! `DensityError` covers configuration and scale-selection failures. Numeric
//! domain problems (the log of a non-positive value, an empty bin in a weighted
//! average) are not errors: they surface as NaN or infinite values in the
//! returned arrays so that partially valid data still renders.

use crate::Axis;
use thiserror::Error;

/// Custom error type for density engine operations.
#[derive(Debug, Error)]
pub enum DensityError {
    /// Invalid engine configuration, e.g. a non-positive downres factor
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The plotting surface reported a scale this engine cannot bin in
    #[error("Unsupported {axis} scale: '{name}' (expected linear, log or symlog)")]
    UnsupportedScale { axis: Axis, name: String },

    /// A symlog scale was requested without the parameter it needs
    #[error("Missing symlog parameter '{parameter}'")]
    MissingScaleParameter { parameter: &'static str },

    /// Coordinate or weight arrays that should be aligned are not
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DensityError {
    /// Create a Configuration error with a message
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an UnsupportedScale error
    pub fn unsupported_scale(axis: Axis, name: impl Into<String>) -> Self {
        Self::UnsupportedScale {
            axis,
            name: name.into(),
        }
    }

    /// Create a MissingScaleParameter error
    pub fn missing_scale_parameter(parameter: &'static str) -> Self {
        Self::MissingScaleParameter { parameter }
    }

    /// Create a LengthMismatch error
    pub fn length_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what,
            expected,
            actual,
        }
    }
}

// Type alias for Result using DensityError
pub type Result<T> = std::result::Result<T, DensityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error() {
        let error = DensityError::configuration("downres_factor must be positive");
        assert!(matches!(error, DensityError::Configuration { .. }));
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("downres_factor must be positive"));
    }

    #[test]
    fn test_unsupported_scale_error() {
        let error = DensityError::unsupported_scale(Axis::Y, "logit");
        assert!(matches!(
            error,
            DensityError::UnsupportedScale { axis: Axis::Y, .. }
        ));
        assert!(error.to_string().contains("Unsupported y scale"));
        assert!(error.to_string().contains("logit"));
    }

    #[test]
    fn test_missing_scale_parameter_error() {
        let error = DensityError::missing_scale_parameter("linthresh");
        assert!(error.to_string().contains("linthresh"));
    }

    #[test]
    fn test_length_mismatch_error() {
        let error = DensityError::length_mismatch("y", 5, 4);
        let message = error.to_string();
        assert!(message.contains("expected 5"));
        assert!(message.contains("got 4"));
    }

    #[test]
    fn test_serialization_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: DensityError = err.into();
        assert!(matches!(error, DensityError::Serialization(_)));
    }
}
