//! Seasonal period detection from lagged autocorrelation.
//!
//! This is a first-match heuristic over a short list of common periods,
//! not a spectral estimator: candidates are checked in order and the first
//! one whose lagged correlation clears the threshold wins, even if a later
//! candidate correlates more strongly.

use crate::utils::stats::lagged_correlation;

/// Candidate periods, threshold and fallback of the detector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonalPeriodPolicy {
    /// Periods checked in order.
    pub candidates: Vec<usize>,
    /// A candidate qualifies when `|r| > threshold`.
    pub threshold: f64,
    /// Period returned when no candidate qualifies.
    pub default_period: usize,
}

impl Default for SeasonalPeriodPolicy {
    fn default() -> Self {
        Self {
            candidates: vec![4, 12, 24, 52],
            threshold: 0.3,
            default_period: 12,
        }
    }
}

impl SeasonalPeriodPolicy {
    pub fn with_candidates(mut self, candidates: Vec<usize>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_default_period(mut self, period: usize) -> Self {
        self.default_period = period;
        self
    }
}

/// Detect the seasonal period of `values` with the default policy.
///
/// Checks 4, 12, 24 and 52 in that order, skipping any period longer than
/// half the series, and returns the first whose lag correlation exceeds
/// 0.3 in absolute value. Falls back to 12.
pub fn detect_seasonal_period(values: &[f64]) -> usize {
    detect_seasonal_period_with(values, &SeasonalPeriodPolicy::default())
}

/// Detect the seasonal period of `values` under `policy`.
pub fn detect_seasonal_period_with(values: &[f64], policy: &SeasonalPeriodPolicy) -> usize {
    for (period, r) in seasonal_candidates(values, policy) {
        if r.abs() > policy.threshold {
            tracing::debug!(period, autocorr = r, "seasonal period detected");
            return period;
        }
    }
    tracing::debug!(
        period = policy.default_period,
        "no candidate period qualified; using default"
    );
    policy.default_period
}

/// Lag correlation of every eligible candidate, in policy order.
///
/// Candidates longer than half the series are skipped. Constant windows
/// give a NaN correlation, which never qualifies.
pub fn seasonal_candidates(values: &[f64], policy: &SeasonalPeriodPolicy) -> Vec<(usize, f64)> {
    let half = values.len() / 2;
    policy
        .candidates
        .iter()
        .filter(|&&period| period > 0 && period <= half)
        .map(|&period| (period, lagged_correlation(values, period)))
        .collect()
}
