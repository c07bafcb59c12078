//! Classical moving-average seasonal decomposition.
//!
//! The trend is a centred moving average over one period (a 2×m average
//! when the period is even). Seasonal indices are per-position means of the
//! detrended series, normalised to mean 0 (additive) or 1
//! (multiplicative). Trend and residual are `NaN` in the half-window at
//! each edge.

use crate::detection::detect_seasonal_period;
use crate::error::{ForecastError, Result};
use crate::utils::stats::variance;

/// How the components combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecompositionModel {
    /// `observed = trend + seasonal + residual`
    #[default]
    Additive,
    /// `observed = trend * seasonal * residual`
    Multiplicative,
}

/// Components of a decomposed series, each as long as the input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decomposition {
    pub model: DecompositionModel,
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
    /// One index per position in the cycle.
    pub seasonal_indices: Vec<f64>,
}

impl Decomposition {
    /// Seasonal strength in `[0, 1]` over the points where the trend is
    /// defined. Close to 1 means the seasonal component dominates the
    /// residual.
    pub fn seasonal_strength(&self) -> f64 {
        self.strength(&self.seasonal)
    }

    /// Trend strength in `[0, 1]` over the points where the trend is defined.
    pub fn trend_strength(&self) -> f64 {
        self.strength(&self.trend)
    }

    fn strength(&self, component: &[f64]) -> f64 {
        let (remainder, combined): (Vec<f64>, Vec<f64>) = component
            .iter()
            .zip(&self.residual)
            .filter(|(c, r)| c.is_finite() && r.is_finite())
            .map(|(&c, &r)| match self.model {
                DecompositionModel::Additive => (r, c + r),
                DecompositionModel::Multiplicative => (r.ln(), c.ln() + r.ln()),
            })
            .unzip();
        if remainder.len() < 2 {
            return 0.0;
        }
        let var_combined = variance(&combined);
        if var_combined < 1e-10 {
            return 0.0;
        }
        (1.0 - variance(&remainder) / var_combined).max(0.0)
    }
}

/// Decompose `values` with a fixed `period`.
///
/// # Errors
///
/// - `InvalidParameter` when `period < 2`, or when a multiplicative
///   decomposition meets a non-positive value
/// - `InsufficientData` with fewer than two full periods
/// - `NonFiniteData` when a value is NaN or infinite
pub fn decompose(
    values: &[f64],
    period: usize,
    model: DecompositionModel,
) -> Result<Decomposition> {
    if period < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "decomposition period must be at least 2, got {}",
            period
        )));
    }
    if values.len() < 2 * period {
        return Err(ForecastError::InsufficientData {
            needed: 2 * period,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::NonFiniteData);
    }
    if model == DecompositionModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
        return Err(ForecastError::InvalidParameter(
            "multiplicative decomposition requires strictly positive values".to_string(),
        ));
    }

    let trend = centred_moving_average(values, period);
    let detrended: Vec<f64> = values
        .iter()
        .zip(&trend)
        .map(|(&y, &t)| match model {
            DecompositionModel::Additive => y - t,
            DecompositionModel::Multiplicative => y / t,
        })
        .collect();

    let seasonal_indices = seasonal_indices(&detrended, period, model);
    let seasonal: Vec<f64> = (0..values.len())
        .map(|i| seasonal_indices[i % period])
        .collect();
    let residual: Vec<f64> = detrended
        .iter()
        .zip(&seasonal)
        .map(|(&d, &s)| match model {
            DecompositionModel::Additive => d - s,
            DecompositionModel::Multiplicative => d / s,
        })
        .collect();

    Ok(Decomposition {
        model,
        period,
        observed: values.to_vec(),
        trend,
        seasonal,
        residual,
        seasonal_indices,
    })
}

/// Decompose `values` using the period from
/// [`detect_seasonal_period`](crate::detection::detect_seasonal_period).
pub fn decompose_detected(values: &[f64], model: DecompositionModel) -> Result<Decomposition> {
    let period = detect_seasonal_period(values);
    tracing::debug!(period, "decomposing with detected period");
    decompose(values, period, model)
}

/// Centred moving average; `NaN` where the window does not fit.
fn centred_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let even = period % 2 == 0;
    let mut trend = vec![f64::NAN; n];
    for (i, slot) in trend.iter_mut().enumerate().take(n - half).skip(half) {
        let window = &values[i - half..=i + half];
        let sum: f64 = if even {
            window.iter().sum::<f64>() - 0.5 * (window[0] + window[2 * half])
        } else {
            window.iter().sum()
        };
        *slot = sum / period as f64;
    }
    trend
}

fn seasonal_indices(detrended: &[f64], period: usize, model: DecompositionModel) -> Vec<f64> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for (i, &v) in detrended.iter().enumerate() {
        if v.is_finite() {
            sums[i % period] += v;
            counts[i % period] += 1;
        }
    }
    let raw: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect();

    let centre = raw.iter().sum::<f64>() / period as f64;
    match model {
        DecompositionModel::Additive => raw.iter().map(|r| r - centre).collect(),
        DecompositionModel::Multiplicative => raw.iter().map(|r| r / centre).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PATTERN: [f64; 4] = [2.0, -1.0, 0.5, -1.5];

    fn additive_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 10.0 + 0.5 * t as f64 + PATTERN[t % 4])
            .collect()
    }

    #[test]
    fn additive_recovers_linear_trend_and_pattern() {
        let values = additive_series(40);
        let d = decompose(&values, 4, DecompositionModel::Additive).unwrap();

        for t in 2..38 {
            assert_relative_eq!(d.trend[t], 10.0 + 0.5 * t as f64, epsilon = 1e-10);
            assert_relative_eq!(d.residual[t], 0.0, epsilon = 1e-10);
        }
        for (i, &p) in PATTERN.iter().enumerate() {
            assert_relative_eq!(d.seasonal_indices[i], p, epsilon = 1e-10);
        }
        assert_relative_eq!(d.seasonal_indices.iter().sum::<f64>(), 0.0, epsilon = 1e-10);
        assert!(d.seasonal_strength() > 0.99);
    }

    #[test]
    fn edges_are_undefined() {
        let d = decompose(&additive_series(20), 4, DecompositionModel::Additive).unwrap();
        assert!(d.trend[0].is_nan() && d.trend[1].is_nan());
        assert!(d.trend[18].is_nan() && d.trend[19].is_nan());
        assert!(d.residual[19].is_nan());
        assert!(d.trend[2].is_finite() && d.trend[17].is_finite());
        assert!(d.seasonal.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn odd_period_uses_plain_window() {
        let values: Vec<f64> = (0..30)
            .map(|t| 3.0 * t as f64 + [1.0, 0.0, -1.0][t % 3])
            .collect();
        let d = decompose(&values, 3, DecompositionModel::Additive).unwrap();
        assert!(d.trend[0].is_nan() && d.trend[29].is_nan());
        assert_relative_eq!(d.trend[1], 3.0, epsilon = 1e-10);
        assert_relative_eq!(d.seasonal_indices[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn multiplicative_indices_average_to_one() {
        let factors = [1.2, 0.8, 1.1, 0.9];
        let values: Vec<f64> = (0..48)
            .map(|t| (10.0 + t as f64) * factors[t % 4])
            .collect();
        let d = decompose(&values, 4, DecompositionModel::Multiplicative).unwrap();

        assert_relative_eq!(d.seasonal_indices.iter().sum::<f64>() / 4.0, 1.0, epsilon = 1e-10);
        for (i, &f) in factors.iter().enumerate() {
            assert_relative_eq!(d.seasonal_indices[i], f, epsilon = 0.02);
        }
        for t in 2..46 {
            let rebuilt = d.trend[t] * d.seasonal[t] * d.residual[t];
            assert_relative_eq!(rebuilt, values[t], max_relative = 1e-10);
        }
    }

    #[test]
    fn rejects_invalid_input() {
        let values = additive_series(7);
        assert!(matches!(
            decompose(&values, 4, DecompositionModel::Additive),
            Err(ForecastError::InsufficientData { needed: 8, got: 7 })
        ));
        assert!(decompose(&additive_series(20), 1, DecompositionModel::Additive).is_err());

        let mut with_zero = additive_series(20);
        with_zero[3] = 0.0;
        assert!(decompose(&with_zero, 4, DecompositionModel::Multiplicative).is_err());
        assert!(decompose(&with_zero, 4, DecompositionModel::Additive).is_ok());
    }

    #[test]
    fn detected_period_is_used() {
        let values: Vec<f64> = (0..48).map(|t| PATTERN[t % 4]).collect();
        let d = decompose_detected(&values, DecompositionModel::Additive).unwrap();
        assert_eq!(d.period, 4);
    }
}
