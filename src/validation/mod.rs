//! Stationarity testing and residual diagnostics.
//!
//! # Example
//!
//! ```
//! use tsforecast::validation::{compute_diagnostics, make_stationary};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05, 0.02];
//! let diagnostics = compute_diagnostics(&residuals);
//! assert!(!diagnostics.inconclusive);
//!
//! let trend: Vec<f64> = (0..50).map(|t| (t * t) as f64).collect();
//! let (_, d) = make_stationary(&trend, 2);
//! assert!(d <= 2);
//! ```

pub mod residual_tests;
pub mod stationarity;

pub use residual_tests::{compute_diagnostics, ljung_box, DiagnosticsBundle, LjungBoxResult};
pub use stationarity::{
    adf_test, check_stationarity, make_stationary, CriticalValues, StationarityCheck,
};
