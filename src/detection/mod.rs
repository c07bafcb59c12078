//! Detection utilities for time series analysis.

mod seasonality;

pub use seasonality::{
    detect_seasonal_period, detect_seasonal_period_with, seasonal_candidates,
    SeasonalPeriodPolicy,
};
