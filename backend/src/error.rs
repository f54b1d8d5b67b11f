//! Error types for the queueing simulator
//!
//! Only construction and configuration can fail. Everything that happens
//! while the engine runs (a full buffer, a busy processor, an empty buffer)
//! is a normal outcome reported through `Option`/`Result<(), T>` values.

use thiserror::Error;

/// Errors raised while building or inspecting a simulation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    /// A numeric parameter is outside its valid range
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Configuration is structurally unusable (no sources, index mismatch, ...)
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),

    /// Statistics were requested before the simulation reached its end
    #[error("Simulation has not finished yet")]
    NotFinished,
}

impl SimulationError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fail with `InvalidParameter` unless `value` is a finite number greater than zero
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::invalid_parameter(
            name,
            format!("must be greater than 0, got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive_rejects_zero_negative_and_nan() {
        assert!(ensure_positive("rate", 1.5).is_ok());
        assert!(ensure_positive("rate", 0.0).is_err());
        assert!(ensure_positive("rate", -2.0).is_err());
        assert!(ensure_positive("rate", f64::NAN).is_err());
        assert!(ensure_positive("rate", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SimulationError::invalid_parameter("capacity", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid parameter `capacity`: must be at least 1, got 0"
        );
    }
}
