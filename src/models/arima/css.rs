//! Conditional-sum-of-squares ARIMA/SARIMA estimation engine.
//!
//! The series is differenced by `(1-B)^d (1-B^s)^D`, the multiplicative
//! AR and MA polynomials are expanded into plain lag polynomials, and the
//! coefficients are chosen by a Nelder-Mead search minimising the sum of
//! squared one-step errors. Errors before the first usable AR lag are
//! conditioned to zero.
//!
//! Each AR and MA block is parameterised by its partial autocorrelations,
//! mapped through `bound * tanh`, so every fitted polynomial is stationary
//! (AR) or invertible (MA).

use crate::core::{ConfidenceLevel, Series};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{poly_mul, Differencing};
use crate::models::arima::order::{model_label, ModelOrder, SeasonalOrder};
use crate::models::traits::{EstimationEngine, FitStatistics, FittedModel, PredictionPath};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::mean;
use std::f64::consts::PI;

/// Configuration of the CSS engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CssConfig {
    pub optimizer: NelderMeadConfig,
    /// Partial autocorrelations of every AR and MA block are kept within
    /// `(-bound, bound)`; must lie in `(0, 1)`.
    pub coefficient_bound: f64,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            optimizer: NelderMeadConfig::default(),
            coefficient_bound: 0.99,
        }
    }
}

impl CssConfig {
    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_coefficient_bound(mut self, bound: f64) -> Self {
        self.coefficient_bound = bound;
        self
    }
}

/// Reference [`EstimationEngine`] using conditional sum of squares.
#[derive(Debug, Clone, Default)]
pub struct CssEngine {
    config: CssConfig,
}

/// Estimated coefficients and the data needed to forecast.
#[derive(Debug, Clone)]
pub struct CssState {
    /// Mean of the differenced series (zero when differencing is applied).
    pub intercept: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Expanded AR lag coefficients, `w_t = sum ar_full[i] w_{t-1-i} + ...`.
    ar_full: Vec<f64>,
    /// Expanded MA lag coefficients.
    ma_full: Vec<f64>,
    differencing: Differencing,
    history: Vec<f64>,
    differenced: Vec<f64>,
    innovations: Vec<f64>,
}

/// Positions of each coefficient block in the parameter vector.
#[derive(Debug, Clone, Copy)]
struct Layout {
    with_mean: bool,
    p: usize,
    q: usize,
    sp: usize,
    sq: usize,
    period: usize,
}

impl Layout {
    fn new(order: ModelOrder, seasonal: Option<SeasonalOrder>) -> Self {
        let (sp, sd, sq, period) = seasonal
            .map(|s| (s.p(), s.d(), s.q(), s.period()))
            .unwrap_or((0, 0, 0, 0));
        Self {
            with_mean: order.d + sd == 0,
            p: order.p,
            q: order.q,
            sp,
            sq,
            period,
        }
    }

    fn coefficient_count(&self) -> usize {
        self.p + self.q + self.sp + self.sq
    }

    fn len(&self) -> usize {
        usize::from(self.with_mean) + self.coefficient_count()
    }

    /// Lags of the expanded AR polynomial.
    fn ar_lags(&self) -> usize {
        self.p + self.sp * self.period
    }

    /// Split `params` into (mean, ar, ma, seasonal ar, seasonal ma).
    fn split<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64], &'a [f64], &'a [f64]) {
        let (mu, rest) = if self.with_mean {
            (params[0], &params[1..])
        } else {
            (0.0, params)
        };
        let (ar, rest) = rest.split_at(self.p);
        let (ma, rest) = rest.split_at(self.q);
        let (sar, sma) = rest.split_at(self.sp);
        (mu, ar, ma, sar, sma)
    }

    /// Model coefficients of an unconstrained optimiser point.
    fn coefficients(&self, params: &[f64], bound: f64) -> Coefficients {
        let (mu, ar, ma, sar, sma) = self.split(params);
        let invertible = |raw: &[f64]| -> Vec<f64> {
            stationary_coefficients(raw, bound)
                .into_iter()
                .map(|c| -c)
                .collect()
        };
        Coefficients {
            mu,
            ar: stationary_coefficients(ar, bound),
            ma: invertible(ma),
            sar: stationary_coefficients(sar, bound),
            sma: invertible(sma),
        }
    }

    /// Expanded lag coefficients of `phi(B) Phi(B^s)` and `theta(B) Theta(B^s)`.
    fn expand(&self, ar: &[f64], ma: &[f64], sar: &[f64], sma: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let ar_poly = poly_mul(
            &lag_poly(ar, 1, -1.0),
            &lag_poly(sar, self.period.max(1), -1.0),
        );
        let ma_poly = poly_mul(
            &lag_poly(ma, 1, 1.0),
            &lag_poly(sma, self.period.max(1), 1.0),
        );
        let ar_full = ar_poly.iter().skip(1).map(|c| -c).collect();
        let ma_full = ma_poly.iter().skip(1).copied().collect();
        (ar_full, ma_full)
    }
}

/// Mean and lag coefficients of one candidate.
#[derive(Debug, Clone)]
struct Coefficients {
    mu: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sar: Vec<f64>,
    sma: Vec<f64>,
}

impl Coefficients {
    fn expand(&self, layout: &Layout) -> (Vec<f64>, Vec<f64>) {
        layout.expand(&self.ar, &self.ma, &self.sar, &self.sma)
    }
}

/// Coefficients `phi` of a stationary `1 - sum phi_i B^i` from unconstrained
/// values, via partial autocorrelations `bound * tanh(x)` and the
/// Durbin-Levinson recursion.
fn stationary_coefficients(raw: &[f64], bound: f64) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(raw.len());
    for (k, x) in raw.iter().enumerate() {
        let r = bound * x.tanh();
        let mut next: Vec<f64> = (0..k).map(|j| phi[j] - r * phi[k - 1 - j]).collect();
        next.push(r);
        phi = next;
    }
    phi
}

/// `1 + sign * sum coefs[i] B^{step*(i+1)}`.
fn lag_poly(coefs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefs.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// One-step errors of the differenced series; zero before `start`.
fn innovations(w: &[f64], mu: f64, ar_full: &[f64], ma_full: &[f64], start: usize) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut pred = mu;
        for (i, a) in ar_full.iter().enumerate() {
            pred += a * (w[t - 1 - i] - mu);
        }
        for (j, m) in ma_full.iter().enumerate() {
            if t > j {
                pred += m * e[t - 1 - j];
            }
        }
        e[t] = w[t] - pred;
    }
    e
}

impl CssEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CssConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CssConfig {
        &self.config
    }

    fn estimate(&self, label: &str, layout: &Layout, w: &[f64], start: usize) -> Coefficients {
        let bound = self.config.coefficient_bound;
        let mut initial = Vec::with_capacity(layout.len());
        if layout.with_mean {
            initial.push(mean(&w[start..]));
        }
        for block in [layout.p, layout.q, layout.sp, layout.sq] {
            for i in 0..block {
                initial.push((0.1 / (i + 1) as f64 / bound).atanh());
            }
        }
        let bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); initial.len()];

        let objective = |params: &[f64]| {
            let coefs = layout.coefficients(params, bound);
            let (ar_full, ma_full) = coefs.expand(layout);
            innovations(w, coefs.mu, &ar_full, &ma_full, start)[start..]
                .iter()
                .map(|e| e * e)
                .sum::<f64>()
        };

        let result = nelder_mead(objective, &initial, &bounds, &self.config.optimizer);
        if !result.converged {
            tracing::debug!(
                model = %label,
                iterations = result.iterations,
                css = result.optimal_value,
                "optimizer stopped before converging"
            );
        }
        layout.coefficients(&result.optimal_point, bound)
    }
}

impl EstimationEngine for CssEngine {
    type State = CssState;

    fn name(&self) -> &str {
        "css"
    }

    fn fit(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
    ) -> Result<FittedModel<CssState>> {
        let label = model_label(order, seasonal);
        let layout = Layout::new(order, seasonal);
        let differencing = match seasonal {
            Some(s) => Differencing::new(order.d, s.d(), s.period()),
            None => Differencing::regular(order.d),
        };

        let bound = self.config.coefficient_bound;
        if !(bound > 0.0 && bound < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "coefficient bound must lie in (0, 1), got {}",
                bound
            )));
        }

        let values = series.values();
        let w = differencing.apply(values);
        let start = layout.ar_lags();
        // Every coefficient, the mean if estimated, and sigma^2.
        let k = layout.len() + 1;
        let needed = differencing.lost() + start + k + 1;
        if values.len() < needed || w.len() <= start {
            return Err(ForecastError::estimation(
                label,
                format!(
                    "insufficient data: need at least {} observations, got {}",
                    needed,
                    values.len()
                ),
            ));
        }

        let coefs = self.estimate(&label, &layout, &w, start);
        let (ar_full, ma_full) = coefs.expand(&layout);
        let e = innovations(&w, coefs.mu, &ar_full, &ma_full, start);

        let n_eff = (w.len() - start) as f64;
        let css: f64 = e[start..].iter().map(|v| v * v).sum();
        if !css.is_finite() {
            return Err(ForecastError::estimation(label, "sum of squares is not finite"));
        }
        let sigma2 = css / n_eff;
        if sigma2 <= 0.0 || !sigma2.is_finite() {
            return Err(ForecastError::estimation(
                label,
                "residual variance is not positive",
            ));
        }

        // Over the conditional residuals that sigma2 is estimated from.
        let log_likelihood = -n_eff / 2.0 * (1.0 + (2.0 * PI * sigma2).ln());
        let kf = k as f64;
        let stats = FitStatistics {
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * kf,
            bic: -2.0 * log_likelihood + kf * n_eff.ln(),
            sigma2,
        };

        let offset = differencing.lost() + start;
        let residuals: Vec<f64> = e[start..].to_vec();
        let fitted: Vec<f64> = values[offset..]
            .iter()
            .zip(&residuals)
            .map(|(y, r)| y - r)
            .collect();

        tracing::trace!(
            model = %label,
            aic = stats.aic,
            sigma2,
            "css fit complete"
        );

        let Coefficients {
            mu,
            ar,
            ma,
            sar,
            sma,
        } = coefs;
        let state = CssState {
            intercept: mu,
            ar,
            ma,
            seasonal_ar: sar,
            seasonal_ma: sma,
            ar_full,
            ma_full,
            differencing,
            history: values.to_vec(),
            differenced: w,
            innovations: e,
        };

        FittedModel::new(
            values.len(),
            order,
            seasonal,
            stats,
            fitted,
            residuals,
            state,
        )
    }

    fn forecast(
        &self,
        model: &FittedModel<CssState>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<PredictionPath> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        let label = model_label(model.order(), model.seasonal());
        let state = model.state();
        let mu = state.intercept;

        let mut w = state.differenced.clone();
        let mut e = state.innovations.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = mu;
            for (i, a) in state.ar_full.iter().enumerate() {
                if t > i {
                    pred += a * (w[t - 1 - i] - mu);
                }
            }
            for (j, m) in state.ma_full.iter().enumerate() {
                if t > j {
                    pred += m * e[t - 1 - j];
                }
            }
            w.push(pred);
            e.push(0.0);
        }
        let w_future = &w[state.differenced.len()..];
        let means = state.differencing.integrate(w_future, &state.history);

        let psi = psi_weights(state, horizon);
        let z = level.z_score();
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for (h, point) in means.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let half_width = z * (model.sigma2() * cumulative).sqrt();
            lower.push(point - half_width);
            upper.push(point + half_width);
        }

        if means
            .iter()
            .chain(&lower)
            .chain(&upper)
            .any(|v| !v.is_finite())
        {
            return Err(ForecastError::estimation(label, "forecast is not finite"));
        }

        PredictionPath::new(means, lower, upper)
    }
}

/// MA(infinity) weights of the undifferenced process, `psi[0] = 1`.
fn psi_weights(state: &CssState, horizon: usize) -> Vec<f64> {
    let mut ar_poly = vec![1.0];
    ar_poly.extend(state.ar_full.iter().map(|a| -a));
    let full_ar = poly_mul(&ar_poly, &state.differencing.polynomial());
    // psi_j = m_j - sum_{i=1..j} c_i psi_{j-i}, c = full AR polynomial
    let mut psi = vec![0.0; horizon];
    psi[0] = 1.0;
    for j in 1..horizon {
        let mut v = state.ma_full.get(j - 1).copied().unwrap_or(0.0);
        for i in 1..=j.min(full_ar.len() - 1) {
            v -= full_ar[i] * psi[j - i];
        }
        psi[j] = v;
    }
    psi
}
