//! Ordinary least squares with coefficient standard errors.
//!
//! Used by the unit-root regression, where the t-statistic of a single
//! coefficient and the information criterion of the fit are needed.

use crate::error::{ForecastError, Result};
use std::f64::consts::PI;

/// Result of an OLS fit `y = X @ beta + e`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Coefficients in column order of the design matrix.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Sum of squared residuals.
    pub sse: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `i`.
    pub fn t_stat(&self, i: usize) -> f64 {
        match (self.coefficients.get(i), self.std_errors.get(i)) {
            (Some(b), Some(se)) if *se > 0.0 => b / se,
            _ => f64::NAN,
        }
    }

    /// Gaussian log-likelihood evaluated at the ML variance `sse / n`.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.sse / n).ln() + 1.0)
    }

    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit OLS on a design given as columns (each of length `y.len()`).
///
/// Solves the normal equations by Cholesky decomposition. A design that is
/// rank deficient, or leaves no residual degrees of freedom, is rejected.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "design matrix has no columns".into(),
        ));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    for col in columns {
        if col.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: col.len(),
            });
        }
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("OLS design matrix is not positive definite".into())
    })?;
    let beta = cholesky_solve(&chol, &xty);

    let sse: f64 = (0..n)
        .map(|t| {
            let fitted: f64 = (0..k).map(|j| columns[j][t] * beta[j]).sum();
            (y[t] - fitted).powi(2)
        })
        .sum();
    let sigma2 = sse / (n - k) as f64;

    // diag((X'X)^-1) from solving against unit vectors
    let std_errors = (0..k)
        .map(|i| {
            let mut e = vec![0.0; k];
            e[i] = 1.0;
            let col = cholesky_solve(&chol, &e);
            (sigma2 * col[i]).max(0.0).sqrt()
        })
        .collect();

    if !sse.is_finite() || beta.iter().any(|b| !b.is_finite()) {
        return Err(ForecastError::ComputationError(
            "OLS produced non-finite estimates".into(),
        ));
    }

    Ok(OlsFit {
        coefficients: beta,
        std_errors,
        sse,
        nobs: n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= scale * 1e-12 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L L' x = b` given the Cholesky factor `L`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}
