//! Request-level entry points: automatic, manual, comparison and Prophet
//! forecasts.

use std::borrow::Cow;

use crate::core::Series;
use crate::detection::detect_seasonal_period_with;
use crate::error::{ForecastError, Result};
use crate::models::arima::{
    model_label, ModelOrder, OrderSearch, SearchBounds, SearchMode, SearchOutcome, SeasonalOrder,
};
use crate::models::prophet::{future_frequency, ProphetConfig, ProphetEngine};
use crate::models::EstimationEngine;
use crate::pipeline::assembler::{index_with, validated_record, ForecastAssembler};
use crate::pipeline::request::{ForecastRequest, PipelineConfig};
use crate::pipeline::result::{ForecastResult, ForecastSummary, ModelFamily};
use crate::utils::{compute_metrics, compute_metrics_with_r_squared};
use crate::validation::compute_diagnostics;

/// An automatic forecast and the search that chose its order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoForecast {
    pub result: ForecastResult,
    pub search: SearchOutcome,
    /// Seasonal period used by a seasonal search.
    pub period: Option<usize>,
}

/// Automatic ARIMA and SARIMA forecasts of the same series side by side.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comparison {
    /// Families that succeeded, ARIMA first.
    pub models: Vec<AutoForecast>,
    /// Families that failed, with the reason.
    pub failures: Vec<(ModelFamily, String)>,
    best: usize,
}

impl Comparison {
    /// The successful model with the lowest AIC (first on ties).
    pub fn best(&self) -> &AutoForecast {
        &self.models[self.best]
    }

    pub fn best_family(&self) -> ModelFamily {
        self.best().result.family()
    }

    pub fn get(&self, family: ModelFamily) -> Option<&AutoForecast> {
        self.models.iter().find(|m| m.result.family() == family)
    }
}

/// Runs forecasts for one engine under one configuration.
///
/// The pipeline holds no per-request state, so a single instance can serve
/// concurrent requests.
///
/// # Example
///
/// ```
/// use tsforecast::prelude::*;
///
/// let values: Vec<f64> = (0..80).map(|t| 20.0 + (t as f64 * 0.4).sin()).collect();
/// let series = Series::from_values(values).unwrap();
///
/// let engine = CssEngine::new();
/// let pipeline = ForecastPipeline::new(&engine);
/// let request = ForecastRequest::with_horizon(5).unwrap();
/// let bounds = SearchBounds::arima().with_order(OrderBounds::new(1, 1, 1));
///
/// let auto = pipeline.auto_forecast(&series, &request, &bounds).unwrap();
/// assert_eq!(auto.result.record().horizon(), 5);
/// ```
#[derive(Debug)]
pub struct ForecastPipeline<'e, E: ?Sized> {
    engine: &'e E,
    config: PipelineConfig,
}

impl<'e, E: EstimationEngine + ?Sized> ForecastPipeline<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self {
            engine,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Search an order within `bounds`, then forecast with it.
    ///
    /// Seasonal bounds select a seasonal search over the detected period.
    /// In fast mode only the most recent observations are used.
    #[tracing::instrument(
        skip_all,
        fields(n = series.len(), horizon = request.horizon(), seasonal = bounds.is_seasonal())
    )]
    pub fn auto_forecast(
        &self,
        series: &Series,
        request: &ForecastRequest,
        bounds: &SearchBounds,
    ) -> Result<AutoForecast> {
        let series = self.prepare(series)?;
        self.auto_prepared(&series, request, bounds)
    }

    /// [`auto_forecast`](Self::auto_forecast) with the configured mode's
    /// non-seasonal bounds.
    pub fn auto_arima(&self, series: &Series, request: &ForecastRequest) -> Result<AutoForecast> {
        self.auto_forecast(series, request, &self.config.bounds(false))
    }

    /// [`auto_forecast`](Self::auto_forecast) with the configured mode's
    /// seasonal bounds.
    pub fn auto_sarima(&self, series: &Series, request: &ForecastRequest) -> Result<AutoForecast> {
        self.auto_forecast(series, request, &self.config.bounds(true))
    }

    /// Forecast with a caller-chosen order. Estimation failures propagate.
    #[tracing::instrument(skip_all, fields(n = series.len(), model = %model_label(order, seasonal)))]
    pub fn manual_forecast(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
        request: &ForecastRequest,
    ) -> Result<ForecastResult> {
        let series = self.prepare(series)?;
        self.build(&series, order, seasonal, request)
    }

    /// Automatic ARIMA and SARIMA with the configured mode's bounds.
    ///
    /// A family that fails is logged and left out; the call fails only when
    /// both do.
    #[tracing::instrument(skip_all, fields(n = series.len(), horizon = request.horizon()))]
    pub fn compare(&self, series: &Series, request: &ForecastRequest) -> Result<Comparison> {
        let series = self.prepare(series)?;

        let mut models = Vec::new();
        let mut failures = Vec::new();
        for (family, seasonal) in [(ModelFamily::Arima, false), (ModelFamily::Sarima, true)] {
            match self.auto_prepared(&series, request, &self.config.bounds(seasonal)) {
                Ok(auto) => models.push(auto),
                Err(e) => {
                    tracing::warn!(%family, error = %e, "model family failed; skipping");
                    failures.push((family, e.to_string()));
                }
            }
        }

        if models.is_empty() {
            let reason = failures
                .iter()
                .map(|(family, e)| format!("{}: {}", family, e))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ForecastError::estimation("compare", reason));
        }

        let mut best = 0;
        for (i, model) in models.iter().enumerate().skip(1) {
            let (aic, best_aic) = (model.result.aic(), models[best].result.aic());
            if aic.is_finite() && (best_aic.is_nan() || aic < best_aic) {
                best = i;
            }
        }
        tracing::info!(
            best = %models[best].result.label(),
            aic = models[best].result.aic(),
            "comparison complete"
        );

        Ok(Comparison {
            models,
            failures,
            best,
        })
    }

    /// Forecast with an external Prophet engine.
    ///
    /// Metrics include R²; AIC and BIC are NaN since the family does not
    /// define them. Forecast timestamps fall back to a daily step when the
    /// series frequency cannot be resolved.
    #[tracing::instrument(skip_all, fields(n = series.len(), horizon = request.horizon()))]
    pub fn prophet_forecast<P: ProphetEngine + ?Sized>(
        &self,
        prophet: &P,
        series: &Series,
        config: &ProphetConfig,
        request: &ForecastRequest,
    ) -> Result<ForecastResult> {
        config.validate()?;
        let series = self.prepare(series)?;
        let name = prophet.name();

        let output =
            prophet.fit_forecast(&series, config, request.horizon(), request.confidence())?;
        if output.fitted.len() != series.len() {
            return Err(ForecastError::estimation(
                name,
                format!(
                    "engine returned {} fitted values for {} observations",
                    output.fitted.len(),
                    series.len()
                ),
            ));
        }
        if output.fitted.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::estimation(name, "fitted values are not finite"));
        }

        let frequency = series.has_timestamps().then(|| future_frequency(&series));
        let index = index_with(&series, request.horizon(), frequency)?;
        let record = validated_record(name, index, output.path)?;

        let actual = series.values();
        let residuals: Vec<f64> = actual
            .iter()
            .zip(&output.fitted)
            .map(|(a, f)| a - f)
            .collect();
        let metrics = compute_metrics_with_r_squared(actual, &output.fitted, f64::NAN, f64::NAN)?;
        let diagnostics = compute_diagnostics(&residuals);

        tracing::info!(model = name, rmse = metrics.rmse, "forecast complete");
        Ok(ForecastResult::Prophet {
            summary: ForecastSummary {
                record,
                fitted: output.fitted,
                residuals,
                fitted_offset: 0,
                metrics,
                diagnostics,
                confidence: request.confidence(),
            },
        })
    }

    /// Validate the configuration, cap the history in fast mode and check
    /// the minimum length.
    fn prepare<'s>(&self, series: &'s Series) -> Result<Cow<'s, Series>> {
        self.config.validate()?;
        let cap = self.config.fast_history_cap;
        let series = if self.config.mode == SearchMode::Fast && series.len() > cap {
            tracing::warn!(
                observations = series.len(),
                kept = cap,
                "fast mode: truncating history"
            );
            Cow::Owned(series.tail(cap))
        } else {
            Cow::Borrowed(series)
        };
        if series.len() < self.config.min_observations {
            return Err(ForecastError::InsufficientData {
                needed: self.config.min_observations,
                got: series.len(),
            });
        }
        Ok(series)
    }

    fn auto_prepared(
        &self,
        series: &Series,
        request: &ForecastRequest,
        bounds: &SearchBounds,
    ) -> Result<AutoForecast> {
        let search = OrderSearch::new(self.engine).with_constraints(self.config.constraints);
        let (outcome, period) = match bounds.seasonal {
            Some(seasonal_bounds) => {
                let period = detect_seasonal_period_with(series.values(), &self.config.seasonality);
                let outcome =
                    search.search_seasonal_order(series, period, bounds.order, seasonal_bounds)?;
                (outcome, Some(period))
            }
            None => (search.search_order(series, bounds.order), None),
        };
        let result = self.build(series, outcome.order, outcome.seasonal, request)?;
        Ok(AutoForecast {
            result,
            search: outcome,
            period,
        })
    }

    fn build(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
        request: &ForecastRequest,
    ) -> Result<ForecastResult> {
        let assembled = ForecastAssembler::new(self.engine).assemble(
            series,
            order,
            seasonal,
            request.horizon(),
            request.confidence(),
        )?;
        let model = assembled.model;

        let actual = model.aligned_actuals(series)?;
        let metrics = compute_metrics(actual, model.fitted(), model.aic(), model.bic())?;
        let diagnostics =
            compute_diagnostics(model.residuals()).with_log_likelihood(model.log_likelihood());

        tracing::info!(
            model = %model_label(order, seasonal),
            aic = model.aic(),
            rmse = metrics.rmse,
            ljung_box_pvalue = diagnostics.ljung_box_pvalue,
            "forecast complete"
        );

        let summary = ForecastSummary {
            record: assembled.record,
            fitted: model.fitted().to_vec(),
            residuals: model.residuals().to_vec(),
            fitted_offset: model.offset(),
            metrics,
            diagnostics,
            confidence: request.confidence(),
        };
        Ok(match seasonal {
            Some(seasonal) => ForecastResult::Sarima {
                order,
                seasonal,
                summary,
            },
            None => ForecastResult::Arima { order, summary },
        })
    }
}
