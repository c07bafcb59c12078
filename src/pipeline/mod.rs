//! Forecast pipeline: requests, assembly and the tagged result.
//!
//! [`ForecastPipeline`] ties the analyzers together for one request:
//! history preparation, seasonal period detection, order search, a final
//! fit and forecast through [`ForecastAssembler`], then metrics and
//! residual diagnostics.

mod assembler;
mod forecaster;
mod request;
mod result;

pub use assembler::{forecast_index, Assembled, ForecastAssembler};
pub use forecaster::{AutoForecast, Comparison, ForecastPipeline};
pub use request::{ForecastRequest, PipelineConfig, MAX_HORIZON};
pub use result::{ForecastResult, ForecastSummary, ModelFamily};
