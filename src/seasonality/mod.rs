//! Seasonal decomposition.
//!
//! Splits a series into trend, seasonal and residual components with a
//! centred moving average, either additively or multiplicatively.

mod decompose;

pub use decompose::{decompose, decompose_detected, Decomposition, DecompositionModel};
