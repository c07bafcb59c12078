//! Performance metrics for in-sample fit evaluation.

use crate::error::{ForecastError, Result};

/// Performance metrics of a fitted model.
///
/// `mape` is stored as a raw value and is `NaN` when an actual value is
/// zero; use [`MetricsBundle::mape`] to get it as a checked result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsBundle {
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Absolute Percentage Error in percent (NaN if undefined)
    pub mape_raw: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Akaike information criterion of the fitted model
    pub aic: f64,
    /// Bayesian information criterion of the fitted model
    pub bic: f64,
    /// Coefficient of determination, for families that report it
    pub r_squared: Option<f64>,
}

impl MetricsBundle {
    /// MAPE, or `DegenerateMetric` when an actual value was zero.
    pub fn mape(&self) -> Result<f64> {
        if self.mape_raw.is_nan() {
            return Err(ForecastError::DegenerateMetric(
                "MAPE is undefined when an actual value is zero".to_string(),
            ));
        }
        Ok(self.mape_raw)
    }

    /// Attach an R² value.
    pub fn with_r_squared(mut self, r_squared: f64) -> Self {
        self.r_squared = Some(r_squared);
        self
    }
}

/// Compute RMSE, MAE, MAPE and MSE of `fitted` against `actual`.
///
/// When the slices differ in length only their overlapping tails are
/// compared, since fitted values cover the most recent observations.
pub fn compute_metrics(actual: &[f64], fitted: &[f64], aic: f64, bic: f64) -> Result<MetricsBundle> {
    let (actual, fitted) = overlap(actual, fitted)?;
    let n = actual.len() as f64;

    let mse: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n;

    let mae: f64 = actual
        .iter()
        .zip(fitted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n;

    let mape_raw = match mape(actual, fitted) {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                observations = actual.len(),
                "actual series contains zero; MAPE is undefined"
            );
            f64::NAN
        }
    };

    Ok(MetricsBundle {
        rmse: mse.sqrt(),
        mae,
        mape_raw,
        mse,
        aic,
        bic,
        r_squared: None,
    })
}

/// [`compute_metrics`] with R² included.
pub fn compute_metrics_with_r_squared(
    actual: &[f64],
    fitted: &[f64],
    aic: f64,
    bic: f64,
) -> Result<MetricsBundle> {
    let bundle = compute_metrics(actual, fitted, aic, bic)?;
    let (actual, fitted) = overlap(actual, fitted)?;
    Ok(bundle.with_r_squared(r_squared(actual, fitted)))
}

fn overlap<'a>(actual: &'a [f64], fitted: &'a [f64]) -> Result<(&'a [f64], &'a [f64])> {
    let n = actual.len().min(fitted.len());
    if n == 0 {
        return Err(ForecastError::EmptyData);
    }
    Ok((&actual[actual.len() - n..], &fitted[fitted.len() - n..]))
}

/// Mean absolute percentage error in percent.
///
/// Returns `DegenerateMetric` when any actual value is zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    if actual.contains(&0.0) {
        return Err(ForecastError::DegenerateMetric(
            "MAPE is undefined when an actual value is zero".to_string(),
        ));
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Ok(100.0 * sum / actual.len() as f64)
}

/// Coefficient of determination. A constant actual series yields 1.0 for
/// a perfect fit and 0.0 otherwise.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    let mean_actual = actual.iter().sum::<f64>() / n;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perfect_fit_has_zero_error() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let bundle = compute_metrics(&actual, &actual, 10.0, 12.0).unwrap();
        assert_relative_eq!(bundle.rmse, 0.0);
        assert_relative_eq!(bundle.mae, 0.0);
        assert_relative_eq!(bundle.mape().unwrap(), 0.0);
        assert_relative_eq!(bundle.aic, 10.0);
        assert_relative_eq!(bundle.bic, 12.0);
        assert!(bundle.r_squared.is_none());
    }

    #[test]
    fn metrics_known_values() {
        let actual = vec![2.0, 4.0, 5.0, 8.0];
        let fitted = vec![3.0, 4.0, 3.0, 8.0];
        let bundle = compute_metrics(&actual, &fitted, 0.0, 0.0).unwrap();

        // errors: -1, 0, 2, 0
        assert_relative_eq!(bundle.mse, 5.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(bundle.rmse, (5.0_f64 / 4.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(bundle.mae, 3.0 / 4.0, epsilon = 1e-12);
        // |1/2| + 0 + |2/5| + 0 = 0.9
        assert_relative_eq!(bundle.mape().unwrap(), 100.0 * 0.9 / 4.0, epsilon = 1e-10);
    }

    #[test]
    fn zero_actual_makes_mape_degenerate() {
        let actual = vec![0.0, 1.0, 2.0];
        let fitted = vec![0.5, 1.0, 2.0];
        let bundle = compute_metrics(&actual, &fitted, 0.0, 0.0).unwrap();

        assert!(bundle.mape_raw.is_nan());
        assert!(matches!(
            bundle.mape(),
            Err(ForecastError::DegenerateMetric(_))
        ));
        assert!(bundle.rmse.is_finite());
        assert!(matches!(
            mape(&actual, &fitted),
            Err(ForecastError::DegenerateMetric(_))
        ));
    }

    #[test]
    fn metrics_use_overlapping_tail() {
        let actual = vec![100.0, 1.0, 2.0, 3.0];
        let fitted = vec![1.0, 2.0, 3.0];
        let bundle = compute_metrics(&actual, &fitted, 0.0, 0.0).unwrap();
        assert_relative_eq!(bundle.rmse, 0.0);
    }

    #[test]
    fn r_squared_variant() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let fitted = vec![1.1, 1.9, 3.2, 3.8, 5.0];
        let bundle = compute_metrics_with_r_squared(&actual, &fitted, f64::NAN, f64::NAN).unwrap();
        let r2 = bundle.r_squared.unwrap();
        // ss_res = 0.01 + 0.01 + 0.04 + 0.04 = 0.10, ss_tot = 10
        assert_relative_eq!(r2, 0.99, epsilon = 1e-10);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            compute_metrics(&[], &[], 0.0, 0.0),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn slice_helpers() {
        let actual = [1.0, 2.0, 3.0];
        let predicted = [2.0, 2.0, 2.0];
        assert_relative_eq!(mae(&actual, &predicted), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(mse(&actual, &predicted), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(rmse(&actual, &predicted), (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(mae(&actual, &[1.0]).is_nan());
    }
}
