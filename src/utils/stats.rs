//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Quantile function of the standard normal distribution.
///
/// # Example
/// ```
/// use tsforecast::utils::quantile_normal;
///
/// // 95% confidence level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    standard_normal()
        .map(|n| n.inverse_cdf(p))
        .unwrap_or(f64::NAN)
}

/// Cumulative distribution function of the standard normal distribution.
pub fn cdf_normal(x: f64) -> f64 {
    standard_normal().map(|n| n.cdf(x)).unwrap_or(f64::NAN)
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Pearson correlation between `values[lag..]` and `values[..n - lag]`.
///
/// Each window is centred on its own mean. Returns NaN when fewer than two
/// pairs exist or either window is constant.
pub fn lagged_correlation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag >= n || n - lag < 2 {
        return f64::NAN;
    }
    pearson(&values[lag..], &values[..n - lag])
}

/// Pearson correlation of two equally long slices.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return f64::NAN;
    }
    sxy / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_normal_known_values() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 1e-8);
        assert_relative_eq!(quantile_normal(0.975), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.025), -1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.995), 2.575829, epsilon = 1e-5);
    }

    #[test]
    fn quantile_normal_boundary_values() {
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(quantile_normal(1.0), f64::INFINITY);
    }

    #[test]
    fn cdf_normal_is_symmetric() {
        assert_relative_eq!(cdf_normal(0.0), 0.5, epsilon = 1e-10);
        assert_relative_eq!(cdf_normal(1.5) + cdf_normal(-1.5), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn mean_and_variance() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
        assert_relative_eq!(
            std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.5_f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn lagged_correlation_of_linear_trend_is_one() {
        // Both windows of a straight line are perfectly correlated.
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert_relative_eq!(lagged_correlation(&values, 3), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn lagged_correlation_of_alternating_series() {
        let values: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_relative_eq!(lagged_correlation(&values, 1), -1.0, epsilon = 1e-10);
        assert_relative_eq!(lagged_correlation(&values, 2), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn lagged_correlation_degenerate_cases() {
        assert!(lagged_correlation(&[5.0; 10], 2).is_nan());
        assert!(lagged_correlation(&[1.0, 2.0, 3.0], 2).is_nan());
        assert!(lagged_correlation(&[1.0, 2.0], 5).is_nan());
    }
}
