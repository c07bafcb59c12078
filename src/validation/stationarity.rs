//! Unit-root testing and differencing to stationarity.

use crate::error::{ForecastError, Result};
use crate::models::arima::diff::difference;
use crate::utils::ols::{ols_fit, OlsFit};
use crate::utils::stats::cdf_normal;

/// Significance level below which a series is treated as stationary.
pub const STATIONARITY_ALPHA: f64 = 0.05;

/// Result of an Augmented Dickey-Fuller test.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationarityCheck {
    /// t-statistic of the lagged level coefficient
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the chosen regression
    pub lags: usize,
    /// Observations used in the chosen regression
    pub nobs: usize,
    pub is_stationary: bool,
    pub critical_values: CriticalValues,
}

/// Critical values of the test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalValues {
    pub cv_1pct: f64,
    pub cv_5pct: f64,
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) response surface for the constant-only regression.
    fn for_nobs(nobs: usize) -> Self {
        let t = nobs as f64;
        let surface = |c: [f64; 4]| c[0] + c[1] / t + c[2] / t.powi(2) + c[3] / t.powi(3);
        Self {
            cv_1pct: surface([-3.43035, -6.5393, -16.786, -79.433]),
            cv_5pct: surface([-2.86154, -2.8903, -4.234, -40.040]),
            cv_10pct: surface([-2.56677, -1.5384, -2.809, 0.0]),
        }
    }
}

/// Test `values` for stationarity with the default lag search.
///
/// The series is stationary when the ADF p-value is below 0.05.
pub fn check_stationarity(values: &[f64]) -> Result<StationarityCheck> {
    adf_test(values, None)
}

/// Augmented Dickey-Fuller test with a constant.
///
/// Fits `dy_t = a + b*y_{t-1} + sum_{i=1..k} g_i*dy_{t-i} + e_t` for every
/// `k` in `0..=max_lags` on a common sample, picks `k` by AIC, refits on
/// the full sample and reports the t-statistic of `b`.
///
/// `max_lags` defaults to `ceil(12 * (n/100)^(1/4))`, and is always capped
/// at `n/2 - 2`.
pub fn adf_test(values: &[f64], max_lags: Option<usize>) -> Result<StationarityCheck> {
    let n = values.len();
    if n < 4 {
        return Err(ForecastError::InsufficientData { needed: 4, got: n });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::NonFiniteData);
    }

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = max_lags.unwrap_or(default_lags).min(n / 2 - 2);

    let diff = difference(values, 1);

    let lags = select_lag_by_aic(values, &diff, max_lags)?;
    let fit = adf_regression(values, &diff, lags, lags)?;

    let statistic = fit.t_stat(1);
    if !statistic.is_finite() {
        return Err(ForecastError::ComputationError(
            "ADF statistic is not finite".to_string(),
        ));
    }
    let p_value = mackinnon_p_value(statistic);

    Ok(StationarityCheck {
        statistic,
        p_value,
        lags,
        nobs: fit.nobs,
        is_stationary: p_value < STATIONARITY_ALPHA,
        critical_values: CriticalValues::for_nobs(fit.nobs),
    })
}

fn select_lag_by_aic(values: &[f64], diff: &[f64], max_lags: usize) -> Result<usize> {
    let mut best: Option<(usize, f64)> = None;
    for lags in 0..=max_lags {
        let aic = match adf_regression(values, diff, lags, max_lags) {
            Ok(fit) => fit.aic(),
            Err(_) => continue,
        };
        if aic.is_nan() {
            continue;
        }
        match best {
            Some((_, best_aic)) if aic >= best_aic => {}
            _ => best = Some((lags, aic)),
        }
    }
    best.map(|(lags, _)| lags).ok_or_else(|| {
        ForecastError::ComputationError("no ADF regression could be fitted".to_string())
    })
}

/// Regression with `lags` lagged differences on rows starting after the
/// first `skip` differences, so fits with different `lags` can share a
/// sample.
fn adf_regression(values: &[f64], diff: &[f64], lags: usize, skip: usize) -> Result<OlsFit> {
    let rows = diff.len().saturating_sub(skip);
    if rows == 0 {
        return Err(ForecastError::InsufficientData {
            needed: skip + 2,
            got: values.len(),
        });
    }

    let y: Vec<f64> = diff[skip..].to_vec();
    let mut columns = Vec::with_capacity(lags + 2);
    columns.push(vec![1.0; rows]);
    // diff[t] = values[t+1] - values[t], so the lagged level is values[t]
    columns.push(values[skip..skip + rows].to_vec());
    for i in 1..=lags {
        columns.push(diff[skip - i..skip - i + rows].to_vec());
    }

    ols_fit(&y, &columns)
}

/// MacKinnon (1994) approximate p-value, constant-only regression, one
/// integrated variable.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefs: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefs
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);
    cdf_normal(z)
}

/// Difference `values` until the ADF test calls it stationary, at most
/// `max_diff` times.
///
/// A test that cannot be computed counts as non-stationary. Returns the
/// (possibly) differenced series and the number of differences applied.
pub fn make_stationary(values: &[f64], max_diff: usize) -> (Vec<f64>, usize) {
    let mut current = values.to_vec();
    let mut d = 0;

    while d < max_diff {
        match check_stationarity(&current) {
            Ok(check) if check.is_stationary => break,
            Ok(check) => {
                tracing::debug!(d, p_value = check.p_value, "series not stationary");
            }
            Err(err) => {
                tracing::debug!(d, error = %err, "stationarity test failed; differencing");
            }
        }
        if current.len() < 2 {
            break;
        }
        current = difference(&current, 1);
        d += 1;
    }

    (current, d)
}
