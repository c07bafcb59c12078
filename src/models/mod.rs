//! Model orders, estimation engines and order search.

mod traits;

pub mod arima;
pub mod prophet;

pub use prophet::{ProphetConfig, ProphetEngine, ProphetOutput};
pub use traits::{EstimationEngine, FitStatistics, FittedModel, PredictionPath};
