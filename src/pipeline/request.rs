//! Forecast request and pipeline configuration.

use crate::core::ConfidenceLevel;
use crate::detection::SeasonalPeriodPolicy;
use crate::error::{ForecastError, Result};
use crate::models::arima::{SearchBounds, SearchConstraints, SearchMode};

/// Longest horizon a request may ask for.
pub const MAX_HORIZON: usize = 1000;

/// Horizon and interval coverage of one forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastRequest {
    horizon: usize,
    confidence: ConfidenceLevel,
}

impl ForecastRequest {
    /// Fails unless `1 <= horizon <= 1000`.
    pub fn new(horizon: usize, confidence: ConfidenceLevel) -> Result<Self> {
        if horizon == 0 || horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "horizon must be between 1 and {}, got {}",
                MAX_HORIZON, horizon
            )));
        }
        Ok(Self {
            horizon,
            confidence,
        })
    }

    /// Request at the default 95% level.
    pub fn with_horizon(horizon: usize) -> Result<Self> {
        Self::new(horizon, ConfidenceLevel::default())
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }
}

impl Default for ForecastRequest {
    /// 30 steps at 95%.
    fn default() -> Self {
        Self {
            horizon: 30,
            confidence: ConfidenceLevel::default(),
        }
    }
}

/// Pipeline-wide settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Search effort; fast mode also caps the history.
    pub mode: SearchMode,
    /// Most recent observations kept in fast mode.
    pub fast_history_cap: usize,
    /// Shortest series accepted.
    pub min_observations: usize,
    pub seasonality: SeasonalPeriodPolicy,
    pub constraints: SearchConstraints,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Full,
            fast_history_cap: 500,
            min_observations: 10,
            seasonality: SeasonalPeriodPolicy::default(),
            constraints: SearchConstraints::default(),
        }
    }
}

impl PipelineConfig {
    /// Fast mode with the default history cap.
    pub fn fast() -> Self {
        Self::default().with_mode(SearchMode::Fast)
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fast_history_cap(mut self, cap: usize) -> Self {
        self.fast_history_cap = cap;
        self
    }

    pub fn with_min_observations(mut self, min: usize) -> Self {
        self.min_observations = min;
        self
    }

    pub fn with_seasonality(mut self, policy: SeasonalPeriodPolicy) -> Self {
        self.seasonality = policy;
        self
    }

    pub fn with_constraints(mut self, constraints: SearchConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Default search bounds of the configured mode.
    pub fn bounds(&self, seasonal: bool) -> SearchBounds {
        SearchBounds::for_mode(self.mode, seasonal)
    }

    /// Reject a zero minimum, a fast-mode cap below the minimum, or a
    /// seasonal period shorter than 2.
    pub fn validate(&self) -> Result<()> {
        if self.min_observations == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_observations must be at least 1".to_string(),
            ));
        }
        if self.mode == SearchMode::Fast && self.fast_history_cap < self.min_observations {
            return Err(ForecastError::InvalidParameter(format!(
                "fast_history_cap {} is below min_observations {}",
                self.fast_history_cap, self.min_observations
            )));
        }
        let policy = &self.seasonality;
        if let Some(period) = policy
            .candidates
            .iter()
            .chain(std::iter::once(&policy.default_period))
            .find(|&&p| p < 2)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        Ok(())
    }
}
