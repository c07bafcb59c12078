//! Bridge to an external Prophet-style additive model.
//!
//! The crate does not fit Prophet itself. A [`ProphetEngine`] receives the
//! series and a [`ProphetConfig`] and returns in-sample fitted values and a
//! forecast path; the pipeline turns that into a uniform result.

use crate::core::{ConfidenceLevel, Frequency, Series};
use crate::error::{ForecastError, Result};
use crate::models::traits::PredictionPath;
use chrono::{DateTime, Utc};

/// Whether a seasonal component is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeasonalityToggle {
    /// Let the engine decide from the history length.
    #[default]
    Auto,
    On,
    Off,
}

/// How seasonal components combine with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

/// A named holiday and the dates it falls on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Holiday {
    pub name: String,
    pub dates: Vec<DateTime<Utc>>,
}

/// Settings handed to a [`ProphetEngine`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProphetConfig {
    pub yearly_seasonality: SeasonalityToggle,
    pub weekly_seasonality: SeasonalityToggle,
    pub daily_seasonality: SeasonalityToggle,
    pub seasonality_mode: SeasonalityMode,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    /// Share of the history in which trend changepoints may be placed.
    pub changepoint_range: f64,
    pub holidays: Vec<Holiday>,
}

impl Default for ProphetConfig {
    fn default() -> Self {
        Self {
            yearly_seasonality: SeasonalityToggle::Auto,
            weekly_seasonality: SeasonalityToggle::Auto,
            daily_seasonality: SeasonalityToggle::Off,
            seasonality_mode: SeasonalityMode::Additive,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            holidays_prior_scale: 10.0,
            changepoint_range: 0.8,
            holidays: Vec::new(),
        }
    }
}

impl ProphetConfig {
    pub fn with_seasonality(
        mut self,
        yearly: SeasonalityToggle,
        weekly: SeasonalityToggle,
        daily: SeasonalityToggle,
    ) -> Self {
        self.yearly_seasonality = yearly;
        self.weekly_seasonality = weekly;
        self.daily_seasonality = daily;
        self
    }

    pub fn with_seasonality_mode(mut self, mode: SeasonalityMode) -> Self {
        self.seasonality_mode = mode;
        self
    }

    pub fn with_prior_scales(mut self, changepoint: f64, seasonality: f64, holidays: f64) -> Self {
        self.changepoint_prior_scale = changepoint;
        self.seasonality_prior_scale = seasonality;
        self.holidays_prior_scale = holidays;
        self
    }

    pub fn with_changepoint_range(mut self, range: f64) -> Self {
        self.changepoint_range = range;
        self
    }

    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// Reject non-positive prior scales and a changepoint range outside `(0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let scales = [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
            ("holidays_prior_scale", self.holidays_prior_scale),
        ];
        for (name, value) in scales {
            if !(value.is_finite() && value > 0.0) {
                return Err(ForecastError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        Ok(())
    }
}

/// Output of a Prophet fit: one fitted value per observation and the
/// forecast path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProphetOutput {
    pub fitted: Vec<f64>,
    pub path: PredictionPath,
}

/// External Prophet-style backend.
pub trait ProphetEngine: Sync {
    fn name(&self) -> &str {
        "prophet"
    }

    /// Fit `series` under `config` and forecast `horizon` steps at `level`.
    fn fit_forecast(
        &self,
        series: &Series,
        config: &ProphetConfig,
        horizon: usize,
        level: ConfidenceLevel,
    ) -> Result<ProphetOutput>;
}

/// Step used to date Prophet forecasts: the series frequency when it can be
/// resolved, daily otherwise.
pub fn future_frequency(series: &Series) -> Frequency {
    series.resolved_frequency().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "frequency not resolved; dating prophet forecast daily");
        Frequency::daily()
    })
}
