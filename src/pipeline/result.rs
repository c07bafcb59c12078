//! Uniform result shape shared by every model family.

use crate::core::{ConfidenceLevel, ForecastRecord};
use crate::models::arima::{model_label, ModelOrder, SeasonalOrder};
use crate::utils::MetricsBundle;
use crate::validation::DiagnosticsBundle;
use std::fmt;

/// Model family of a [`ForecastResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModelFamily {
    Arima,
    Sarima,
    Prophet,
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Arima => write!(f, "ARIMA"),
            ModelFamily::Sarima => write!(f, "SARIMA"),
            ModelFamily::Prophet => write!(f, "Prophet"),
        }
    }
}

/// Forecast, in-sample fit and quality measures of one model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastSummary {
    pub record: ForecastRecord,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Leading observations without a fitted value.
    pub fitted_offset: usize,
    pub metrics: MetricsBundle,
    pub diagnostics: DiagnosticsBundle,
    pub confidence: ConfidenceLevel,
}

/// Result of a forecast, tagged by model family.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForecastResult {
    Arima {
        order: ModelOrder,
        summary: ForecastSummary,
    },
    Sarima {
        order: ModelOrder,
        seasonal: SeasonalOrder,
        summary: ForecastSummary,
    },
    Prophet {
        summary: ForecastSummary,
    },
}

impl ForecastResult {
    pub fn family(&self) -> ModelFamily {
        match self {
            ForecastResult::Arima { .. } => ModelFamily::Arima,
            ForecastResult::Sarima { .. } => ModelFamily::Sarima,
            ForecastResult::Prophet { .. } => ModelFamily::Prophet,
        }
    }

    pub fn summary(&self) -> &ForecastSummary {
        match self {
            ForecastResult::Arima { summary, .. }
            | ForecastResult::Sarima { summary, .. }
            | ForecastResult::Prophet { summary } => summary,
        }
    }

    pub fn into_summary(self) -> ForecastSummary {
        match self {
            ForecastResult::Arima { summary, .. }
            | ForecastResult::Sarima { summary, .. }
            | ForecastResult::Prophet { summary } => summary,
        }
    }

    pub fn record(&self) -> &ForecastRecord {
        &self.summary().record
    }

    pub fn metrics(&self) -> &MetricsBundle {
        &self.summary().metrics
    }

    pub fn diagnostics(&self) -> &DiagnosticsBundle {
        &self.summary().diagnostics
    }

    /// Non-seasonal order, for ARIMA-family results.
    pub fn order(&self) -> Option<ModelOrder> {
        match self {
            ForecastResult::Arima { order, .. } | ForecastResult::Sarima { order, .. } => {
                Some(*order)
            }
            ForecastResult::Prophet { .. } => None,
        }
    }

    pub fn seasonal_order(&self) -> Option<SeasonalOrder> {
        match self {
            ForecastResult::Sarima { seasonal, .. } => Some(*seasonal),
            _ => None,
        }
    }

    /// AIC of the fit; NaN for families that do not define one.
    pub fn aic(&self) -> f64 {
        self.metrics().aic
    }

    /// Label such as `ARIMA(1,1,1)` or `Prophet`.
    pub fn label(&self) -> String {
        match self {
            ForecastResult::Arima { order, .. } => model_label(*order, None),
            ForecastResult::Sarima {
                order, seasonal, ..
            } => model_label(*order, Some(*seasonal)),
            ForecastResult::Prophet { .. } => ModelFamily::Prophet.to_string(),
        }
    }
}
