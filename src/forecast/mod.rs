//! Forecast Engine
//!
//! Produces point forecasts for a numeric series using three independent
//! models (linear regression, moving average, exponential smoothing), picks
//! the primary model, and derives confidence bounds and a trend label.
//!
//! The engine is a pure function: no I/O, no shared state, and identical
//! input always yields bit-identical output.

mod error;
mod models;
mod report;

pub use error::ForecastError;
pub use models::{
    exponential_smoothing, moving_average, round2, smoothed_level, LinearModel,
    MOVING_AVERAGE_WINDOW, SMOOTHING_ALPHA,
};
pub use report::{format_number, render_report};

use serde::{Deserialize, Serialize};

/// Minimum number of observations accepted by [`forecast`]
pub const MIN_DATA_POINTS: usize = 2;

/// z-value for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// Slope magnitude above which a series counts as trending
pub const TREND_THRESHOLD: f64 = 0.1;

/// Forecasting method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    LinearRegression,
    MovingAverage,
    ExponentialSmoothing,
}

impl std::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastMethod::LinearRegression => write!(f, "Linear Regression"),
            ForecastMethod::MovingAverage => write!(f, "Moving Average"),
            ForecastMethod::ExponentialSmoothing => write!(f, "Exponential Smoothing"),
        }
    }
}

/// Direction of the fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Classify a slope against the fixed ±0.1 thresholds.
    ///
    /// The thresholds do not scale with the data, so a series measured in
    /// large units reads as trending far more easily than one in small units.
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_THRESHOLD {
            Trend::Increasing
        } else if slope < -TREND_THRESHOLD {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "Increasing"),
            Trend::Decreasing => write!(f, "Decreasing"),
            Trend::Stable => write!(f, "Stable"),
        }
    }
}

/// Forecast from a non-primary model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeForecast {
    pub method: ForecastMethod,
    pub values: Vec<f64>,
}

/// Structured forecast result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Primary forecast, one value per requested period
    pub periods: Vec<f64>,
    /// Method that produced `periods`
    pub method: ForecastMethod,
    /// R² of the chosen method
    pub accuracy: f64,
    pub trend: Trend,
    pub slope: f64,
    pub intercept: f64,
    /// `periods[k] - half_width`, absent when the half-width is 0
    pub confidence_lower: Option<Vec<f64>>,
    /// `periods[k] + half_width`, absent when the half-width is 0
    pub confidence_upper: Option<Vec<f64>>,
    pub standard_error: f64,
    pub half_width: f64,
    /// Number of observations in the input series
    pub data_points: usize,
    /// Presentation label for one period, e.g. "days"
    pub interval: String,
    pub alternatives: Vec<AlternativeForecast>,
}

impl ForecastResult {
    /// Values of an alternative method, if it was computed
    pub fn alternative(&self, method: ForecastMethod) -> Option<&[f64]> {
        self.alternatives
            .iter()
            .find(|a| a.method == method)
            .map(|a| a.values.as_slice())
    }
}

/// Reject undersized series and non-finite observations
pub fn validate_series(data: &[f64]) -> Result<(), ForecastError> {
    if data.len() < MIN_DATA_POINTS {
        return Err(ForecastError::InsufficientData {
            required: MIN_DATA_POINTS,
            actual: data.len(),
        });
    }
    if let Some(index) = data.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidData { index });
    }
    Ok(())
}

/// Residual standard error of a linear fit with the degrees of freedom
/// floored at 1
pub fn standard_error(model: &LinearModel, data: &[f64]) -> f64 {
    let ss_res: f64 = model.residuals(data).iter().map(|r| r * r).sum();
    let dof = data.len().saturating_sub(2).max(1) as f64;
    (ss_res / dof).sqrt()
}

/// Forecast `periods` future values of `data`.
///
/// The primary forecast is always linear regression; moving average and
/// exponential smoothing are reported as alternatives. `interval` is only a
/// label carried into the result.
///
/// # Example
///
/// ```rust
/// use mega_agent::forecast::{forecast, Trend};
///
/// let result = forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, "days").unwrap();
/// assert_eq!(result.periods, vec![6.0, 7.0, 8.0]);
/// assert_eq!(result.trend, Trend::Increasing);
/// assert!(result.confidence_lower.is_none());
/// ```
pub fn forecast(data: &[f64], periods: usize, interval: &str) -> Result<ForecastResult, ForecastError> {
    validate_series(data)?;

    let n = data.len();
    let linear = LinearModel::fit(data);
    let linear_forecast = linear.forecast(n, periods);
    let moving = moving_average(data, periods);
    let smoothing = exponential_smoothing(data, periods, SMOOTHING_ALPHA);

    // Fixed selection: linear regression is always primary, whatever the
    // other models would score.
    let method = ForecastMethod::LinearRegression;
    let accuracy = linear.r2;

    let standard_error = standard_error(&linear, data);
    let half_width = standard_error * Z_95;
    let (confidence_lower, confidence_upper) = if half_width > 0.0 {
        (
            Some(linear_forecast.iter().map(|v| v - half_width).collect()),
            Some(linear_forecast.iter().map(|v| v + half_width).collect()),
        )
    } else {
        (None, None)
    };

    Ok(ForecastResult {
        periods: linear_forecast,
        method,
        accuracy,
        trend: Trend::from_slope(linear.slope),
        slope: linear.slope,
        intercept: linear.intercept,
        confidence_lower,
        confidence_upper,
        standard_error,
        half_width,
        data_points: n,
        interval: interval.to_string(),
        alternatives: vec![
            AlternativeForecast {
                method: ForecastMethod::MovingAverage,
                values: moving,
            },
            AlternativeForecast {
                method: ForecastMethod::ExponentialSmoothing,
                values: smoothing,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_length_matches_request() {
        let data = [4.0, 7.5, 3.2, 9.9, 12.0, 1.0];
        for periods in [0, 1, 5, 12, 40] {
            let result = forecast(&data, periods, "days").unwrap();
            assert_eq!(result.periods.len(), periods);
            for alt in &result.alternatives {
                assert_eq!(alt.values.len(), periods);
            }
        }
    }

    #[test]
    fn test_perfect_line_has_no_bounds() {
        let result = forecast(&[1.0, 2.0, 3.0, 4.0, 5.0], 3, "days").unwrap();
        assert_eq!(result.periods, vec![6.0, 7.0, 8.0]);
        assert_eq!(result.method, ForecastMethod::LinearRegression);
        assert!((result.accuracy - 1.0).abs() < 1e-12);
        assert_eq!(result.half_width, 0.0);
        assert!(result.confidence_lower.is_none());
        assert!(result.confidence_upper.is_none());
        assert_eq!(
            result.alternative(ForecastMethod::MovingAverage),
            Some(&[4.0, 4.0, 4.0][..])
        );
    }

    #[test]
    fn test_constant_series() {
        let result = forecast(&[5.0, 5.0, 5.0, 5.0], 4, "weeks").unwrap();
        assert_eq!(result.accuracy, 0.0);
        assert_eq!(result.trend, Trend::Stable);
        assert_eq!(result.periods, vec![5.0; 4]);
        assert!(result.confidence_lower.is_none());
    }

    #[test]
    fn test_two_points_floor_degrees_of_freedom() {
        // Two points are always fit exactly; the floored denominator keeps
        // the error finite and zero.
        let result = forecast(&[3.0, 9.0], 2, "days").unwrap();
        assert_eq!(result.standard_error, 0.0);
        assert_eq!(result.periods, vec![15.0, 21.0]);
        assert_eq!(result.trend, Trend::Increasing);
    }

    #[test]
    fn test_bounds_are_symmetric_around_forecast() {
        let result = forecast(&[3.0, 5.0, 4.0, 7.0, 8.0], 3, "days").unwrap();
        assert!(result.half_width > 0.0);
        let lower = result.confidence_lower.as_ref().unwrap();
        let upper = result.confidence_upper.as_ref().unwrap();
        for k in 0..3 {
            assert_eq!(lower[k], result.periods[k] - result.half_width);
            assert_eq!(upper[k], result.periods[k] + result.half_width);
        }
        assert!((result.half_width - result.standard_error * Z_95).abs() < 1e-12);
    }

    #[test]
    fn test_decreasing_trend() {
        let result = forecast(&[10.0, 8.0, 6.0, 4.0], 1, "months").unwrap();
        assert_eq!(result.trend, Trend::Decreasing);
        assert_eq!(result.periods, vec![2.0]);
    }

    #[test]
    fn test_trend_thresholds_are_exclusive() {
        assert_eq!(Trend::from_slope(0.1), Trend::Stable);
        assert_eq!(Trend::from_slope(-0.1), Trend::Stable);
        assert_eq!(Trend::from_slope(0.1001), Trend::Increasing);
        assert_eq!(Trend::from_slope(-0.1001), Trend::Decreasing);
    }

    #[test]
    fn test_rejects_short_series() {
        assert_eq!(
            forecast(&[], 3, "days"),
            Err(ForecastError::InsufficientData { required: 2, actual: 0 })
        );
        let err = forecast(&[1.0], 3, "days").unwrap_err();
        assert!(err.to_string().contains("at least 2 data points required"));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = forecast(&[1.0, bad, 3.0], 3, "days").unwrap_err();
            assert_eq!(err, ForecastError::InvalidData { index: 1 });
        }
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let data = [12.1, 13.7, 11.9, 15.2, 16.8, 14.4, 18.3];
        let a = forecast(&data, 6, "days").unwrap();
        let b = forecast(&data, 6, "days").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.half_width.to_bits(), b.half_width.to_bits());
    }

    #[test]
    fn test_interval_does_not_affect_values() {
        let data = [2.0, 4.5, 3.5, 6.0];
        let days = forecast(&data, 3, "days").unwrap();
        let months = forecast(&data, 3, "months").unwrap();
        assert_eq!(days.periods, months.periods);
        assert_eq!(days.confidence_upper, months.confidence_upper);
        assert_eq!(months.interval, "months");
    }
}
