//! Core data structures for time series forecasting.

mod confidence;
mod forecast;
mod frequency;
mod time_series;

pub use confidence::ConfidenceLevel;
pub use forecast::{ForecastIndex, ForecastPoint, ForecastRecord};
pub use frequency::Frequency;
pub use time_series::{Series, SeriesBuilder};
