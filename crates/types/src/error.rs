//! Argument validation errors.

use thiserror::Error;

/// A configuration value that has no physical meaning or names no variant.
///
/// Raised at the configuration boundary, before any device is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidArgument {
    /// Harvesting scenario index outside the defined variants.
    #[error("energy scenario index {0} is out of range (expected 0-4)")]
    ScenarioIndex(u32),

    /// Harvesting scenario name that matches no variant.
    #[error("unknown energy scenario: {0}")]
    ScenarioName(String),

    /// Discovery protocol index outside the defined variants.
    #[error("discovery protocol index {0} is out of range (expected 0-3)")]
    ProtocolIndex(u32),

    /// Discovery protocol name that matches no variant.
    #[error("unknown discovery protocol: {0}")]
    ProtocolName(String),

    /// A run needs at least one device.
    #[error("device count must be at least 1")]
    NoDevices,

    /// A numeric parameter outside its admissible range.
    #[error("{name} must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },
}

impl InvalidArgument {
    /// Require `value` to be finite and strictly positive.
    pub fn require_positive(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                name,
                requirement: "a finite value greater than zero",
                value,
            })
        }
    }

    /// Require `value` to be finite and not negative.
    pub fn require_non_negative(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                name,
                requirement: "a finite, non-negative value",
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert_eq!(InvalidArgument::require_positive("x", 1.5), Ok(1.5));
        assert!(InvalidArgument::require_positive("x", 0.0).is_err());
        assert!(InvalidArgument::require_positive("x", -2.0).is_err());
        assert!(InvalidArgument::require_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(InvalidArgument::require_non_negative("x", 0.0), Ok(0.0));
        assert!(InvalidArgument::require_non_negative("x", -0.001).is_err());
        assert!(InvalidArgument::require_non_negative("x", f64::INFINITY).is_err());
    }

    #[test]
    fn test_out_of_range_message_names_parameter() {
        let err = InvalidArgument::require_positive("beacon interval", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "beacon interval must be a finite value greater than zero, got -1"
        );
    }
}
