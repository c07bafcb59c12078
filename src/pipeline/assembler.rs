//! Fit one order, forecast it and align the forecast with the series index.

use crate::core::{ConfidenceLevel, ForecastIndex, ForecastRecord, Frequency, Series};
use crate::error::{ForecastError, Result};
use crate::models::arima::{model_label, ModelOrder, SeasonalOrder};
use crate::models::{EstimationEngine, FittedModel, PredictionPath};

/// A validated forecast together with the model that produced it.
#[derive(Debug, Clone)]
pub struct Assembled<S> {
    pub record: ForecastRecord,
    pub model: FittedModel<S>,
}

/// Drives an engine for a chosen order and produces a [`ForecastRecord`].
#[derive(Debug)]
pub struct ForecastAssembler<'e, E: ?Sized> {
    engine: &'e E,
}

impl<'e, E: EstimationEngine + ?Sized> ForecastAssembler<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Fit `order` once, forecast `horizon` steps at `level` and index the
    /// result.
    ///
    /// Engine output that is the wrong length, non-finite or has bounds on
    /// the wrong side of the mean is reported as `EstimationFailure`; no
    /// partial record is returned.
    #[tracing::instrument(skip_all, fields(n = series.len(), horizon))]
    pub fn assemble(
        &self,
        series: &Series,
        order: ModelOrder,
        seasonal: Option<SeasonalOrder>,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<Assembled<E::State>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "forecast horizon must be at least 1".to_string(),
            ));
        }
        let label = model_label(order, seasonal);

        let model = self.engine.fit(series, order, seasonal)?;
        let path = self.engine.forecast(&model, horizon, level)?;
        let index = forecast_index(series, horizon)?;
        let record = validated_record(&label, index, path)?;

        tracing::debug!(model = %label, aic = model.aic(), "forecast assembled");
        Ok(Assembled { record, model })
    }
}

/// Index of the `horizon` steps after the end of `series`.
///
/// Extrapolates the series frequency from the last timestamp; falls back to
/// positions `n..n + horizon` when the series has no timestamps or its
/// frequency cannot be resolved.
pub fn forecast_index(series: &Series, horizon: usize) -> Result<Vec<ForecastIndex>> {
    let frequency = match series.resolved_frequency() {
        Ok(freq) => Some(freq),
        Err(e) => {
            if series.has_timestamps() {
                tracing::debug!(error = %e, "frequency not resolved; using integer positions");
            }
            None
        }
    };
    index_with(series, horizon, frequency)
}

/// Like [`forecast_index`], with the step fixed by the caller.
pub(crate) fn index_with(
    series: &Series,
    horizon: usize,
    frequency: Option<Frequency>,
) -> Result<Vec<ForecastIndex>> {
    match (series.last_timestamp(), frequency) {
        (Some(last), Some(freq)) => Ok(freq
            .extrapolate(last, horizon)?
            .into_iter()
            .map(ForecastIndex::Timestamp)
            .collect()),
        _ => {
            let n = series.len();
            Ok((n..n + horizon).map(ForecastIndex::Position).collect())
        }
    }
}

/// Check an engine path against the horizon and build the record.
pub(crate) fn validated_record(
    label: &str,
    index: Vec<ForecastIndex>,
    path: PredictionPath,
) -> Result<ForecastRecord> {
    if path.len() != index.len() {
        return Err(ForecastError::estimation(
            label,
            format!(
                "engine returned {} forecast steps, expected {}",
                path.len(),
                index.len()
            ),
        ));
    }
    let PredictionPath {
        means,
        lower,
        upper,
    } = path;
    ForecastRecord::new(index, means, lower, upper)
        .map_err(|e| ForecastError::estimation(label, format!("invalid forecast path: {}", e)))
}
