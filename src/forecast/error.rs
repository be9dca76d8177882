//! Forecast error types

use thiserror::Error;

/// Errors that can occur while validating a series for forecasting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Fewer observations than the models need
    #[error("at least {required} data points required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A NaN or infinite observation was supplied
    #[error("invalid data points detected - all values must be valid numbers (index {index})")]
    InvalidData { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let error = ForecastError::InsufficientData { required: 2, actual: 1 };
        assert_eq!(error.to_string(), "at least 2 data points required, got 1");
    }

    #[test]
    fn test_invalid_data_message() {
        let error = ForecastError::InvalidData { index: 3 };
        assert!(error.to_string().starts_with("invalid data points detected"));
        assert!(error.to_string().contains("index 3"));
    }
}
