//! # tsforecast
//!
//! Automatic and manual ARIMA/SARIMA forecasting.
//!
//! The crate covers the control logic around an estimation backend:
//! stationarity analysis (augmented Dickey-Fuller), seasonal period
//! detection, exhaustive AIC order search, forecast assembly with
//! timestamp extrapolation, in-sample metrics and Ljung-Box residual
//! diagnostics. Estimation itself sits behind the
//! [`EstimationEngine`](models::EstimationEngine) trait; a
//! conditional-sum-of-squares engine ships as [`CssEngine`](models::arima::CssEngine).
//!
//! ```
//! use tsforecast::prelude::*;
//!
//! let values: Vec<f64> = (0..60).map(|t| 10.0 + (t as f64 * 0.5).cos()).collect();
//! let series = Series::from_values(values).unwrap();
//!
//! let engine = CssEngine::new();
//! let request = ForecastRequest::with_horizon(6).unwrap();
//! let result = ForecastPipeline::new(&engine)
//!     .manual_forecast(&series, ModelOrder::new(1, 0, 1), None, &request)
//!     .unwrap();
//!
//! assert_eq!(result.record().horizon(), 6);
//! ```

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod seasonality;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{ConfidenceLevel, ForecastIndex, ForecastRecord, Frequency, Series};
    pub use crate::detection::detect_seasonal_period;
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::arima::{
        CssEngine, ModelOrder, OrderBounds, OrderSearch, SearchBounds, SearchMode,
        SeasonalBounds, SeasonalOrder,
    };
    pub use crate::models::EstimationEngine;
    pub use crate::pipeline::{
        ForecastPipeline, ForecastRequest, ForecastResult, PipelineConfig,
    };
    pub use crate::utils::MetricsBundle;
    pub use crate::validation::{check_stationarity, DiagnosticsBundle};
}
