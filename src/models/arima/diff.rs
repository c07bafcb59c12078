//! Differencing and integration for ARIMA-family models.

/// Apply `d` rounds of first differencing.
///
/// Each round drops the leading undefined value, so the result is `d`
/// shorter than the input (or empty).
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` differencing.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Multiply two polynomials given by coefficients in increasing powers.
pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        if *x == 0.0 {
            continue;
        }
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Combined regular and seasonal differencing `(1-B)^d (1-B^s)^D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Differencing {
    pub d: usize,
    pub seasonal_d: usize,
    pub period: usize,
}

impl Differencing {
    pub fn regular(d: usize) -> Self {
        Self {
            d,
            seasonal_d: 0,
            period: 0,
        }
    }

    pub fn new(d: usize, seasonal_d: usize, period: usize) -> Self {
        if period == 0 {
            return Self::regular(d);
        }
        Self {
            d,
            seasonal_d,
            period,
        }
    }

    /// Observations lost at the start of the series.
    pub fn lost(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Regular differences first, then seasonal ones. The operators
    /// commute, so the order only affects rounding.
    pub fn apply(&self, series: &[f64]) -> Vec<f64> {
        let regular = difference(series, self.d);
        seasonal_difference(&regular, self.seasonal_d, self.period)
    }

    /// Coefficients of the differencing polynomial in increasing powers of B.
    pub fn polynomial(&self) -> Vec<f64> {
        let mut poly = vec![1.0];
        for _ in 0..self.d {
            poly = poly_mul(&poly, &[1.0, -1.0]);
        }
        if self.period > 0 {
            let mut seasonal = vec![0.0; self.period + 1];
            seasonal[0] = 1.0;
            seasonal[self.period] = -1.0;
            for _ in 0..self.seasonal_d {
                poly = poly_mul(&poly, &seasonal);
            }
        }
        poly
    }

    /// Map forecasts of the differenced series back to the original scale.
    ///
    /// `history` is the undifferenced series the forecasts continue. Uses
    /// `y_t = w_t - sum_{j>=1} c_j y_{t-j}` with `c` the differencing
    /// polynomial.
    pub fn integrate(&self, forecasts: &[f64], history: &[f64]) -> Vec<f64> {
        let poly = self.polynomial();
        let mut extended = history.to_vec();
        let n = history.len();

        for &w in forecasts {
            let t = extended.len();
            let mut y = w;
            for (j, c) in poly.iter().enumerate().skip(1) {
                if *c != 0.0 && j <= t {
                    y -= c * extended[t - j];
                }
            }
            extended.push(y);
        }
        extended.split_off(n)
    }
}

/// Undo `d` rounds of first differencing for forecasts that continue `history`.
pub fn integrate(differenced: &[f64], history: &[f64], d: usize) -> Vec<f64> {
    Differencing::regular(d).integrate(differenced, history)
}
