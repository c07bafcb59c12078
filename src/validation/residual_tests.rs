//! Residual diagnostics for fitted models.

use crate::utils::stats::{lagged_correlation, mean, std_dev};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Number of lags used by the residual diagnostics.
pub const DIAGNOSTIC_LAGS: usize = 10;

/// Ljung-Box test result.
#[derive(Debug, Clone, PartialEq)]
pub struct LjungBoxResult {
    /// Test statistic Q
    pub statistic: f64,
    pub p_value: f64,
    /// Number of lags tested
    pub lags: usize,
    /// Degrees of freedom of the reference chi-squared distribution
    pub df: usize,
}

impl LjungBoxResult {
    /// True if the white-noise null is not rejected at `alpha`.
    pub fn is_white_noise(&self, alpha: f64) -> bool {
        self.p_value > alpha
    }
}

/// Ljung-Box portmanteau test over lags `1..=lags`.
///
/// `fitted_params` reduces the degrees of freedom. Returns `None` when the
/// series is too short for the requested lags (`n <= lags`) or the p-value
/// cannot be computed.
pub fn ljung_box(residuals: &[f64], lags: usize, fitted_params: usize) -> Option<LjungBoxResult> {
    let n = residuals.len();
    if lags == 0 || n <= lags {
        return None;
    }

    let m = mean(residuals);
    let centered: Vec<f64> = residuals.iter().map(|&x| x - m).collect();
    let denom: f64 = centered.iter().map(|&x| x * x).sum();
    let df = lags.saturating_sub(fitted_params).max(1);

    if denom == 0.0 {
        return Some(LjungBoxResult {
            statistic: 0.0,
            p_value: 1.0,
            lags,
            df,
        });
    }

    let q: f64 = (1..=lags)
        .map(|k| {
            let r_k = centered
                .iter()
                .skip(k)
                .zip(&centered)
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / denom;
            r_k * r_k / (n - k) as f64
        })
        .sum::<f64>()
        * (n * (n + 2)) as f64;

    let p_value = ChiSquared::new(df as f64).ok()?.sf(q);
    if !q.is_finite() || !p_value.is_finite() {
        return None;
    }

    Some(LjungBoxResult {
        statistic: q,
        p_value,
        lags,
        df,
    })
}

/// Summary of a model's residual behaviour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiagnosticsBundle {
    pub residuals_mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub residuals_std: f64,
    /// Pearson correlation of adjacent residual pairs
    pub residuals_autocorr: f64,
    pub ljung_box_stat: f64,
    pub ljung_box_pvalue: f64,
    pub ljung_box_lags: usize,
    /// Log-likelihood of the fit, when the model family reports one
    pub log_likelihood: Option<f64>,
    /// The Ljung-Box values are the 0 / 1 sentinel rather than a test result
    pub inconclusive: bool,
}

impl DiagnosticsBundle {
    pub fn with_log_likelihood(mut self, log_likelihood: f64) -> Self {
        self.log_likelihood = Some(log_likelihood);
        self
    }
}

/// Compute residual diagnostics with a 10-lag Ljung-Box test.
///
/// With fewer than 11 residuals, or when the test cannot be computed,
/// the Ljung-Box statistic is 0, its p-value 1 and `inconclusive` is set.
pub fn compute_diagnostics(residuals: &[f64]) -> DiagnosticsBundle {
    let (ljung_box_stat, ljung_box_pvalue, inconclusive) =
        match ljung_box(residuals, DIAGNOSTIC_LAGS, 0) {
            Some(lb) => (lb.statistic, lb.p_value, false),
            None => {
                tracing::debug!(
                    residuals = residuals.len(),
                    "Ljung-Box not computable; reporting sentinel"
                );
                (0.0, 1.0, true)
            }
        };

    DiagnosticsBundle {
        residuals_mean: mean(residuals),
        residuals_std: std_dev(residuals),
        residuals_autocorr: lagged_correlation(residuals, 1),
        ljung_box_stat,
        ljung_box_pvalue,
        ljung_box_lags: DIAGNOSTIC_LAGS,
        log_likelihood: None,
        inconclusive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    #[test]
    fn ljung_box_statistic_by_hand() {
        // n = 4, lag 1: centred [-1.5, -0.5, 0.5, 1.5], denom 5,
        // r1 = (0.75 - 0.25 + 0.75) / 5 = 0.25, Q = 4*6*0.0625/3 = 0.5
        let lb = ljung_box(&[1.0, 2.0, 3.0, 4.0], 1, 0).unwrap();
        assert_relative_eq!(lb.statistic, 0.5, epsilon = 1e-12);
        assert_eq!(lb.df, 1);
        let expected = ChiSquared::new(1.0).unwrap().sf(0.5);
        assert_relative_eq!(lb.p_value, expected, epsilon = 1e-12);
    }

    #[test]
    fn white_noise_passes_ljung_box() {
        let lb = ljung_box(&noise(300, 7), 10, 0).unwrap();
        assert!(lb.is_white_noise(0.01));
    }

    #[test]
    fn autocorrelated_series_fails_ljung_box() {
        let mut prev = 0.0;
        let series: Vec<f64> = noise(300, 9)
            .into_iter()
            .map(|e| {
                prev = 0.9 * prev + e;
                prev
            })
            .collect();
        let lb = ljung_box(&series, 10, 0).unwrap();
        assert!(lb.p_value < 1e-6);
    }

    #[test]
    fn ljung_box_needs_more_points_than_lags() {
        assert!(ljung_box(&[1.0; 10], 10, 0).is_none());
    }

    #[test]
    fn diagnostics_on_short_residuals_are_inconclusive() {
        let residuals = vec![0.1, -0.2, 0.3, -0.1, 0.0, 0.2, -0.3, 0.1, 0.05, -0.05];
        let bundle = compute_diagnostics(&residuals);
        assert!(bundle.inconclusive);
        assert_eq!(bundle.ljung_box_stat, 0.0);
        assert_eq!(bundle.ljung_box_pvalue, 1.0);
        assert_eq!(bundle.ljung_box_lags, 10);
        assert!(bundle.residuals_mean.is_finite());
    }

    #[test]
    fn diagnostics_summary_values() {
        let residuals = noise(100, 21);
        let bundle = compute_diagnostics(&residuals).with_log_likelihood(-12.5);

        assert!(!bundle.inconclusive);
        assert_relative_eq!(bundle.residuals_mean, mean(&residuals), epsilon = 1e-12);
        assert_relative_eq!(bundle.residuals_std, std_dev(&residuals), epsilon = 1e-12);
        assert!(bundle.residuals_autocorr.abs() < 0.5);
        assert!((0.0..=1.0).contains(&bundle.ljung_box_pvalue));
        assert_eq!(bundle.log_likelihood, Some(-12.5));
    }

    #[test]
    fn alternating_residuals_have_negative_lag_one_correlation() {
        let residuals: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let bundle = compute_diagnostics(&residuals);
        assert_relative_eq!(bundle.residuals_autocorr, -1.0, epsilon = 1e-12);
        assert!(bundle.ljung_box_pvalue < 0.01);
    }
}
