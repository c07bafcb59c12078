//! Engines and series shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tsforecast::core::{ConfidenceLevel, Series};
use tsforecast::models::arima::{model_label, ModelOrder, SeasonalOrder};
use tsforecast::models::{EstimationEngine, FitStatistics, FittedModel, PredictionPath};
use tsforecast::{ForecastError, Result};

/// Engine whose AIC is a fixed function of the order; `None` fails the fit.
pub struct ScriptedEngine<F> {
    script: F,
    calls: AtomicUsize,
}

impl<F> ScriptedEngine<F>
where
    F: Fn(ModelOrder, Option<SeasonalOrder>) -> Option<f64> + Sync,
{
    pub fn new(script: F) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> EstimationEngine for ScriptedEngine<F>
where
    F: Fn(ModelOrder, Option<SeasonalOrder>) -> Option<f64> + Sync,
{
    type State = f64;

    fn name(&self) -> &str {
        "scripted"
    }

    fn fit(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
    ) -> Result<FittedModel<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let aic = (self.script)(order, seasonal)
            .ok_or_else(|| ForecastError::estimation(model_label(order, seasonal), "scripted failure"))?;
        let values = series.values();
        let last = values[values.len() - 1];
        // Random-walk one-step fit: each value predicts the next.
        let fitted: Vec<f64> = values[..values.len() - 1].to_vec();
        let residuals: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        FittedModel::new(
            values.len(),
            order,
            seasonal,
            FitStatistics {
                log_likelihood: -aic / 2.0,
                aic,
                bic: aic + 1.0,
                sigma2: 1.0,
            },
            fitted,
            residuals,
            last,
        )
    }

    /// Flat forecast at the last observation, widening with the horizon.
    fn forecast(
        &self,
        model: &FittedModel<f64>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<PredictionPath> {
        let last = *model.state();
        let z = level.z_score();
        let means = vec![last; horizon];
        let lower = (1..=horizon).map(|h| last - z * (h as f64).sqrt()).collect();
        let upper = (1..=horizon).map(|h| last + z * (h as f64).sqrt()).collect();
        PredictionPath::new(means, lower, upper)
    }
}

/// Wraps an engine and counts `fit` calls.
pub struct CountingEngine<'a, E> {
    inner: &'a E,
    fits: AtomicUsize,
}

impl<'a, E: EstimationEngine> CountingEngine<'a, E> {
    pub fn new(inner: &'a E) -> Self {
        Self {
            inner,
            fits: AtomicUsize::new(0),
        }
    }

    pub fn fits(&self) -> usize {
        self.fits.load(Ordering::SeqCst)
    }
}

impl<E: EstimationEngine> EstimationEngine for CountingEngine<'_, E> {
    type State = E::State;

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fit(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
    ) -> Result<FittedModel<E::State>> {
        self.fits.fetch_add(1, Ordering::SeqCst);
        self.inner.fit(series, order, seasonal)
    }

    fn forecast(
        &self,
        model: &FittedModel<E::State>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<PredictionPath> {
        self.inner.forecast(model, horizon, level)
    }
}

pub fn uniform_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

pub fn daily_timestamps(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

/// Random walk around 100 with daily timestamps.
pub fn daily_random_walk(n: usize, seed: u64) -> Series {
    let mut level = 100.0;
    let values = uniform_noise(n, seed)
        .into_iter()
        .map(|e| {
            level += e;
            level
        })
        .collect();
    Series::new(daily_timestamps(n), values).unwrap()
}
