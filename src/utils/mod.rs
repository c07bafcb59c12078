//! Utility functions shared by the analyzers and the estimation engine.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{compute_metrics, compute_metrics_with_r_squared, MetricsBundle};
pub use ols::{ols_fit, OlsFit};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{cdf_normal, lagged_correlation, quantile_normal};
