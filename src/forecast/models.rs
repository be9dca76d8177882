//! Forecasting models
//!
//! The three independent models behind the forecast engine. Each operates on
//! an already validated series; time indices start at 1.

use serde::{Deserialize, Serialize};

/// Window used by the moving-average model
pub const MOVING_AVERAGE_WINDOW: usize = 3;

/// Smoothing constant for exponential smoothing
pub const SMOOTHING_ALPHA: f64 = 0.3;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // Normalize -0.0 so it renders as "0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Ordinary least squares fit of `value = slope * index + intercept`
///
/// # Example
///
/// ```rust
/// use mega_agent::forecast::LinearModel;
///
/// let model = LinearModel::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);
/// assert!((model.slope - 1.0).abs() < 1e-12);
/// assert!((model.r2 - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Change per period
    pub slope: f64,
    /// Value at index 0
    pub intercept: f64,
    /// Coefficient of determination, 0 for a constant series
    pub r2: f64,
}

impl LinearModel {
    /// Fit the model over `(i, data[i - 1])` for `i = 1..=n`
    pub fn fit(data: &[f64]) -> Self {
        let n = data.len() as f64;

        let sum_x: f64 = (1..=data.len()).map(|i| i as f64).sum();
        let sum_y: f64 = data.iter().sum();
        let sum_xy: f64 = data
            .iter()
            .enumerate()
            .map(|(i, &y)| (i + 1) as f64 * y)
            .sum();
        let sum_xx: f64 = (1..=data.len()).map(|i| (i * i) as f64).sum();

        let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
        let intercept = (sum_y - slope * sum_x) / n;

        let mean_y = sum_y / n;
        let ss_tot: f64 = data.iter().map(|&y| (y - mean_y).powi(2)).sum();

        let mut model = Self {
            slope,
            intercept,
            r2: 0.0,
        };
        let ss_res: f64 = model.residuals(data).iter().map(|r| r * r).sum();

        model.r2 = if ss_tot != 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };
        model
    }

    /// Fitted value at a 1-based index
    pub fn predict_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }

    /// `y_i - predicted_i` for every observation
    pub fn residuals(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .enumerate()
            .map(|(i, &y)| y - self.predict_at(i + 1))
            .collect()
    }

    /// Forecast `periods` steps past the end of a series of length `n`,
    /// rounded to two decimals
    pub fn forecast(&self, n: usize, periods: usize) -> Vec<f64> {
        (1..=periods)
            .map(|k| round2(self.predict_at(n + k)))
            .collect()
    }
}

/// Flat forecast at the mean of the last `min(3, n)` observations
pub fn moving_average(data: &[f64], periods: usize) -> Vec<f64> {
    let window = MOVING_AVERAGE_WINDOW.min(data.len());
    if window == 0 {
        return Vec::new();
    }
    let tail = &data[data.len() - window..];
    let average = tail.iter().sum::<f64>() / window as f64;
    vec![average; periods]
}

/// Final smoothed level with `S_1 = y_1`, `S_i = alpha * y_i + (1 - alpha) * S_{i-1}`
pub fn smoothed_level(data: &[f64], alpha: f64) -> Option<f64> {
    let (first, rest) = data.split_first()?;
    Some(
        rest.iter()
            .fold(*first, |level, &y| alpha * y + (1.0 - alpha) * level),
    )
}

/// Flat forecast at the final smoothed level, rounded to two decimals
pub fn exponential_smoothing(data: &[f64], periods: usize, alpha: f64) -> Vec<f64> {
    match smoothed_level(data, alpha) {
        Some(level) => vec![round2(level); periods],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_linear_fit_perfect_line() {
        let model = LinearModel::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(approx(model.slope, 1.0));
        assert!(approx(model.intercept, 0.0));
        assert!(approx(model.r2, 1.0));
        assert_eq!(model.forecast(5, 3), vec![6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_linear_fit_offset_line() {
        // y = 2x + 8
        let model = LinearModel::fit(&[10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
        assert!(approx(model.slope, 2.0));
        assert!(approx(model.intercept, 8.0));
        assert_eq!(model.forecast(6, 2), vec![22.0, 24.0]);
    }

    #[test]
    fn test_linear_fit_constant_series_has_zero_r2() {
        let model = LinearModel::fit(&[5.0, 5.0, 5.0, 5.0]);
        assert!(!model.r2.is_nan());
        assert_eq!(model.r2, 0.0);
        assert!(model.slope.abs() < 1e-12);
        assert_eq!(model.forecast(4, 2), vec![5.0, 5.0]);
    }

    #[test]
    fn test_linear_fit_noisy_series() {
        let data = [3.0, 5.0, 4.0, 7.0, 8.0];
        let model = LinearModel::fit(&data);
        // Σx=15 Σy=27 Σxy=93 Σx²=55 → slope=(465-405)/(275-225)=1.2
        assert!(approx(model.slope, 1.2));
        assert!(approx(model.intercept, 1.8));
        assert!(model.r2 > 0.0 && model.r2 < 1.0);

        let residual_sum: f64 = model.residuals(&data).iter().sum();
        assert!(residual_sum.abs() < 1e-9);
    }

    #[test]
    fn test_moving_average_uses_last_three() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 4), vec![4.0; 4]);
    }

    #[test]
    fn test_moving_average_short_series() {
        assert_eq!(moving_average(&[2.0, 4.0], 2), vec![3.0, 3.0]);
    }

    #[test]
    fn test_smoothed_level_recurrence() {
        // S1=10, S2=0.3*20+0.7*10=13, S3=0.3*30+0.7*13=18.1
        let level = smoothed_level(&[10.0, 20.0, 30.0], SMOOTHING_ALPHA).unwrap();
        assert!(approx(level, 18.1));
        assert_eq!(
            exponential_smoothing(&[10.0, 20.0, 30.0], 3, SMOOTHING_ALPHA),
            vec![18.1; 3]
        );
    }

    #[test]
    fn test_exponential_smoothing_is_deterministic() {
        let data = [1.5, 2.25, 3.125, 2.0, 4.75, 5.5];
        let first = exponential_smoothing(&data, 5, SMOOTHING_ALPHA);
        let second = exponential_smoothing(&data, 5, SMOOTHING_ALPHA);
        assert_eq!(
            first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.3333), 4.33);
        assert_eq!(round2(6.0), 6.0);
        assert_eq!(round2(-0.001), 0.0);
        assert!(round2(-0.001).is_sign_positive());
    }
}
