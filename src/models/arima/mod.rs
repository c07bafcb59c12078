//! ARIMA and SARIMA order handling, differencing, estimation and search.
//!
//! This module provides:
//! - [`ModelOrder`], [`SeasonalOrder`] and the search bounds
//! - differencing helpers and their inverse
//! - [`CssEngine`], a conditional-sum-of-squares reference engine
//! - [`OrderSearch`], exhaustive AIC order selection over any engine

pub mod css;
pub mod diff;
pub mod order;
pub mod search;

pub use css::{CssConfig, CssEngine, CssState};
pub use diff::{difference, integrate, seasonal_difference, Differencing};
pub use order::{
    model_label, ModelOrder, OrderBounds, SearchBounds, SearchMode, SeasonalBounds, SeasonalOrder,
};
pub use search::{CandidateScore, CandidateStatus, OrderSearch, SearchConstraints, SearchOutcome};
