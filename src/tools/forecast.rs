//! Forecast Tool
//!
//! Time-series forecasting over a caller-supplied series.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{whole_number, Tool, ToolOutput};
use crate::error::AgentResult;
use crate::forecast::{forecast, render_report};

pub const DEFAULT_PERIODS: u64 = 5;
pub const MAX_PERIODS: u64 = 12;
const INTERVALS: &[&str] = &["days", "weeks", "months"];

/// Above either limit a call needs approval
const APPROVAL_DATA_POINTS: usize = 100;
const APPROVAL_PERIODS: u64 = 6;

#[derive(Default)]
pub struct ForecastTool;

/// `data` as numbers; non-numeric entries become NaN and are rejected by
/// the engine
fn read_series(params: &Value) -> Vec<f64> {
    params["data"]
        .as_array()
        .map(|values| values.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect())
        .unwrap_or_default()
}

fn read_periods(params: &Value) -> Option<u64> {
    match &params["periods"] {
        Value::Null => Some(DEFAULT_PERIODS),
        v => whole_number(v),
    }
}

fn failure(message: impl std::fmt::Display) -> ToolOutput {
    ToolOutput::failure(format!("Error generating forecast: {}", message))
}

#[async_trait]
impl Tool for ForecastTool {
    fn name(&self) -> String {
        "forecast".to_string()
    }

    fn description(&self) -> String {
        "Generate forecasts and predictions based on time series data using statistical analysis. \
         Useful for predicting trends, sales forecasting, and data analysis."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "array",
                    "items": { "type": "number" },
                    "description": "Array of numerical time series data points (minimum 2 values)"
                },
                "periods": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": MAX_PERIODS,
                    "default": DEFAULT_PERIODS,
                    "description": "Number of periods to forecast (1-12)"
                },
                "interval": {
                    "type": "string",
                    "enum": INTERVALS,
                    "default": "days",
                    "description": "Time interval for the forecast periods"
                }
            },
            "required": ["data"]
        })
    }

    fn requires_approval(&self, params: &Value) -> bool {
        let large_dataset = params["data"]
            .as_array()
            .map(|d| d.len() > APPROVAL_DATA_POINTS)
            .unwrap_or(false);
        let long_term = read_periods(params).unwrap_or(0) > APPROVAL_PERIODS;
        large_dataset || long_term
    }

    fn approval_note(&self) -> Option<String> {
        Some(format!(
            "more than {} data points or more than {} periods",
            APPROVAL_DATA_POINTS, APPROVAL_PERIODS
        ))
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let data = read_series(&params);
        if data.is_empty() {
            return Ok(failure("Data array cannot be empty"));
        }

        let periods = match read_periods(&params) {
            Some(p) if (1..=MAX_PERIODS).contains(&p) => p as usize,
            _ => return Ok(failure("Periods must be between 1 and 12")),
        };

        let interval = params["interval"].as_str().unwrap_or("days");
        if !INTERVALS.contains(&interval) {
            return Ok(failure("Interval must be one of days, weeks, months"));
        }

        info!(
            "Processing forecast: {} data points, {} periods, interval {}",
            data.len(),
            periods,
            interval
        );

        match forecast(&data, periods, interval) {
            Ok(result) => {
                debug!("Forecast slope {:.4}, R² {:.3}", result.slope, result.accuracy);
                let report = render_report(&result);
                Ok(ToolOutput::success(serde_json::to_value(&result)?, report))
            }
            Err(e) => Ok(failure(format!("Could not generate forecast: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forecast_defaults() {
        let tool = ForecastTool;
        let res = tool.execute(json!({"data": [1, 2, 3, 4, 5]})).await.unwrap();

        assert!(res.success);
        assert_eq!(res.data["periods"], json!([6.0, 7.0, 8.0, 9.0, 10.0]));
        assert_eq!(res.data["interval"], "days");
        assert!(res.summary.contains("Forecast for next 5 days"));
        assert!(res.summary.contains("6, 7, 8, 9, 10"));
    }

    #[tokio::test]
    async fn test_forecast_weeks_with_bounds() {
        let tool = ForecastTool;
        let res = tool
            .execute(json!({"data": [3, 5, 4, 7, 8], "periods": 2, "interval": "weeks"}))
            .await
            .unwrap();

        assert!(res.success);
        assert!(res.summary.contains("per week"));
        assert!(res.summary.contains("95% Confidence Intervals"));
        assert!(res.data["confidence_lower"].is_array());
    }

    #[tokio::test]
    async fn test_forecast_validation_failures() {
        let tool = ForecastTool;

        let empty = tool.execute(json!({"data": []})).await.unwrap();
        assert_eq!(
            empty.error.as_deref(),
            Some("Error generating forecast: Data array cannot be empty")
        );

        let too_many = tool
            .execute(json!({"data": [1, 2], "periods": 13}))
            .await
            .unwrap();
        assert_eq!(
            too_many.error.as_deref(),
            Some("Error generating forecast: Periods must be between 1 and 12")
        );

        let zero = tool.execute(json!({"data": [1, 2], "periods": 0})).await.unwrap();
        assert!(!zero.success);

        let single = tool.execute(json!({"data": [42]})).await.unwrap();
        assert!(single
            .summary
            .starts_with("Error generating forecast: Could not generate forecast: at least 2 data points required"));

        let bad = tool.execute(json!({"data": [1, "x", 3]})).await.unwrap();
        assert!(bad.summary.contains("invalid data points detected"));

        let interval = tool
            .execute(json!({"data": [1, 2], "interval": "years"}))
            .await
            .unwrap();
        assert!(!interval.success);
    }

    #[tokio::test]
    async fn test_integral_float_periods() {
        let tool = ForecastTool;
        let res = tool
            .execute(json!({"data": [1, 2, 3, 4, 5], "periods": 3.0}))
            .await
            .unwrap();
        assert!(res.success);
        assert_eq!(res.data["periods"], json!([6.0, 7.0, 8.0]));

        let fractional = tool
            .execute(json!({"data": [1, 2, 3], "periods": 2.5}))
            .await
            .unwrap();
        assert_eq!(
            fractional.error.as_deref(),
            Some("Error generating forecast: Periods must be between 1 and 12")
        );

        assert!(tool.requires_approval(&json!({"data": [1, 2, 3], "periods": 7.0})));
    }

    #[test]
    fn test_requires_approval() {
        let tool = ForecastTool;
        assert!(!tool.requires_approval(&json!({"data": [1, 2, 3]})));
        assert!(!tool.requires_approval(&json!({"data": [1, 2, 3], "periods": 6})));
        assert!(tool.requires_approval(&json!({"data": [1, 2, 3], "periods": 7})));

        let big: Vec<u32> = (0..101).collect();
        assert!(tool.requires_approval(&json!({ "data": big })));
        let edge: Vec<u32> = (0..100).collect();
        assert!(!tool.requires_approval(&json!({ "data": edge })));
    }
}
