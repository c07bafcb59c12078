//! Forecast record holding indexed point predictions and interval bounds.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Position of a forecast step: a timestamp, or an integer position when
/// the series carries no usable timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForecastIndex {
    Timestamp(DateTime<Utc>),
    Position(usize),
}

impl ForecastIndex {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            ForecastIndex::Timestamp(ts) => Some(*ts),
            ForecastIndex::Position(_) => None,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            ForecastIndex::Timestamp(_) => None,
            ForecastIndex::Position(p) => Some(*p),
        }
    }
}

/// One forecast step.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastPoint {
    pub index: ForecastIndex,
    pub forecast: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Ordered forecast steps.
///
/// Construction guarantees that every value is finite, that
/// `lower <= forecast <= upper` at every step and that indices are
/// strictly increasing and of one kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastRecord {
    points: Vec<ForecastPoint>,
}

impl ForecastRecord {
    /// Zip indices with means and bounds, validating the record invariants.
    pub fn new(
        index: Vec<ForecastIndex>,
        forecast: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        let horizon = index.len();
        for len in [forecast.len(), lower.len(), upper.len()] {
            if len != horizon {
                return Err(ForecastError::DimensionMismatch {
                    expected: horizon,
                    got: len,
                });
            }
        }

        if index.windows(2).any(|w| {
            !matches!(
                (w[0], w[1]),
                (ForecastIndex::Timestamp(a), ForecastIndex::Timestamp(b)) if b > a
            ) && !matches!(
                (w[0], w[1]),
                (ForecastIndex::Position(a), ForecastIndex::Position(b)) if b > a
            )
        }) {
            return Err(ForecastError::TimestampError(
                "forecast indices must be strictly increasing".to_string(),
            ));
        }

        let mut points = Vec::with_capacity(horizon);
        for (step, idx) in index.into_iter().enumerate() {
            let (f, lo, hi) = (forecast[step], lower[step], upper[step]);
            if !(f.is_finite() && lo.is_finite() && hi.is_finite()) {
                return Err(ForecastError::NonFiniteData);
            }
            if lo > f || f > hi {
                return Err(ForecastError::InvalidParameter(format!(
                    "interval ordering violated at step {}: {} <= {} <= {} does not hold",
                    step + 1,
                    lo,
                    f,
                    hi
                )));
            }
            points.push(ForecastPoint {
                index: idx,
                forecast: f,
                lower: lo,
                upper: hi,
            });
        }

        Ok(Self { points })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter()
    }

    pub fn forecasts(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.forecast).collect()
    }

    pub fn lower(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.lower).collect()
    }

    pub fn upper(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.upper).collect()
    }

    /// Timestamps of the steps, if the record is timestamp-indexed.
    pub fn timestamps(&self) -> Option<Vec<DateTime<Utc>>> {
        self.points.iter().map(|p| p.index.timestamp()).collect()
    }
}

impl<'a> IntoIterator for &'a ForecastRecord {
    type Item = &'a ForecastPoint;
    type IntoIter = std::slice::Iter<'a, ForecastPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
