//! Estimation engine seam shared by the order search and the assembler.

use crate::core::{ConfidenceLevel, Series};
use crate::error::{ForecastError, Result};
use crate::models::arima::{ModelOrder, SeasonalOrder};

/// A statistical backend that fits ARIMA-family models and forecasts them.
///
/// The search and the assembler only borrow the engine, so one engine can
/// serve many concurrent requests.
pub trait EstimationEngine: Sync {
    /// Engine-private state carried by a fitted model.
    type State;

    /// Display name used in logs.
    fn name(&self) -> &str {
        "engine"
    }

    /// Fit `order` (and `seasonal`, if any) to `series`.
    fn fit(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
    ) -> Result<FittedModel<Self::State>>;

    /// Forecast `horizon` steps past the end of the fitted series.
    fn forecast(
        &self,
        model: &FittedModel<Self::State>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<PredictionPath>;
}

impl<E: EstimationEngine + ?Sized> EstimationEngine for &E {
    type State = E::State;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn fit(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
    ) -> Result<FittedModel<Self::State>> {
        (**self).fit(series, order, seasonal)
    }

    fn forecast(
        &self,
        model: &FittedModel<Self::State>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<PredictionPath> {
        (**self).forecast(model, horizon, level)
    }
}

/// Scalar fit statistics reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitStatistics {
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// Innovation variance estimate.
    pub sigma2: f64,
}

/// A model fitted by an [`EstimationEngine`].
///
/// Fitted values and residuals cover the last `fitted.len()` observations
/// of the series; the first `offset` observations were consumed by
/// differencing and lag start-up.
#[derive(Debug, Clone)]
pub struct FittedModel<S> {
    order: ModelOrder,
    seasonal: Option<SeasonalOrder>,
    stats: FitStatistics,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    offset: usize,
    state: S,
}

impl<S> FittedModel<S> {
    /// Build a fitted model for a series of `series_len` observations.
    ///
    /// Fails unless fitted values and residuals have the same non-zero
    /// length no longer than the series.
    pub fn new(
        series_len: usize,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
        stats: FitStatistics,
        fitted: Vec<f64>,
        residuals: Vec<f64>,
        state: S,
    ) -> Result<Self> {
        if fitted.len() != residuals.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: fitted.len(),
                got: residuals.len(),
            });
        }
        if fitted.is_empty() || fitted.len() > series_len {
            return Err(ForecastError::InvalidParameter(format!(
                "fitted length {} is not within 1..={}",
                fitted.len(),
                series_len
            )));
        }
        Ok(Self {
            order,
            seasonal,
            stats,
            offset: series_len - fitted.len(),
            fitted,
            residuals,
            state,
        })
    }

    pub fn order(&self) -> ModelOrder {
        self.order
    }

    pub fn seasonal(&self) -> Option<SeasonalOrder> {
        self.seasonal
    }

    pub fn log_likelihood(&self) -> f64 {
        self.stats.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.stats.aic
    }

    pub fn bic(&self) -> f64 {
        self.stats.bic
    }

    pub fn sigma2(&self) -> f64 {
        self.stats.sigma2
    }

    pub fn statistics(&self) -> FitStatistics {
        self.stats
    }

    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Leading observations without a fitted value.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Observations aligned with the fitted values.
    pub fn aligned_actuals<'a>(&self, series: &'a Series) -> Result<&'a [f64]> {
        let values = series.values();
        if self.offset + self.fitted.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.offset + self.fitted.len(),
                got: values.len(),
            });
        }
        Ok(&values[self.offset..])
    }
}

/// Forecast path produced by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPath {
    pub means: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl PredictionPath {
    pub fn new(means: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        for len in [lower.len(), upper.len()] {
            if len != means.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: means.len(),
                    got: len,
                });
            }
        }
        Ok(Self {
            means,
            lower,
            upper,
        })
    }

    pub fn len(&self) -> usize {
        self.means.len()
    }

    pub fn is_empty(&self) -> bool {
        self.means.is_empty()
    }
}
