//! Text rendering of a forecast result

use super::{round2, ForecastMethod, ForecastResult};

/// Format a number the way the chat front-end expects: shortest form,
/// no trailing zeros, `-0` shown as `0`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format_number(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Singular unit for the slope line ("days" -> "day")
fn singular(interval: &str) -> &str {
    interval.strip_suffix('s').unwrap_or(interval)
}

/// Render the sectioned, emoji-prefixed report shown to users
pub fn render_report(result: &ForecastResult) -> String {
    let mut out = format!(
        "📊 **Forecast Analysis** ({} data points)\n\n",
        result.data_points
    );

    out.push_str(&format!(
        "🔮 **{} Forecast for next {} {}:**\n",
        result.method,
        result.periods.len(),
        result.interval
    ));
    out.push_str(&format!("   {}\n\n", join(&result.periods)));

    out.push_str("📈 **Alternative Methods:**\n");
    for method in [ForecastMethod::MovingAverage, ForecastMethod::ExponentialSmoothing] {
        if let Some(values) = result.alternative(method) {
            out.push_str(&format!("   • {}: {}\n", method, join(values)));
        }
    }
    out.push('\n');

    out.push_str("📊 **Statistical Information:**\n");
    out.push_str(&format!("   • Model Accuracy (R²): {:.3}\n", result.accuracy));
    out.push_str(&format!("   • Trend: {}\n", result.trend));
    out.push_str(&format!(
        "   • Slope: {:.4} per {}\n\n",
        result.slope,
        singular(&result.interval)
    ));

    if let (Some(lower), Some(upper)) = (&result.confidence_lower, &result.confidence_upper) {
        let lower: Vec<f64> = lower.iter().map(|v| round2(*v)).collect();
        let upper: Vec<f64> = upper.iter().map(|v| round2(*v)).collect();
        out.push_str("🎯 **95% Confidence Intervals:**\n");
        out.push_str(&format!("   • Lower bounds: {}\n", join(&lower)));
        out.push_str(&format!("   • Upper bounds: {}\n\n", join(&upper)));
    }

    out.push_str(
        "⚠️ *Forecasts are estimates based on historical data and should be used as guidance only*",
    );
    out
}
