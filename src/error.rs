//! Error types for the demand-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur inside the forecasting pipeline.
///
/// None of these cross [`ForecastEngine::run`](crate::engine::ForecastEngine::run);
/// the engine turns each one into a [`Diagnostic`](crate::engine::Diagnostic).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// A metric observation was negative.
    #[error("negative value {value} at index {index}")]
    NegativeValue { index: usize, value: f64 },

    /// A NaN or infinite observation.
    #[error("non-finite value at index {index}")]
    NonFiniteValue { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 24, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 24, got 5"
        );

        let err = ForecastError::InvalidParameter("alpha must lie in (0, 1)".to_string());
        assert_eq!(
            err.to_string(),
            "invalid parameter: alpha must lie in (0, 1)"
        );

        let err = ForecastError::NegativeValue {
            index: 3,
            value: -2.5,
        };
        assert_eq!(err.to_string(), "negative value -2.5 at index 3");

        let err = ForecastError::NonFiniteValue { index: 7 };
        assert_eq!(err.to_string(), "non-finite value at index 7");

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::InsufficientData { needed: 24, got: 12 };
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
