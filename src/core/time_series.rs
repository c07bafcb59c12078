//! Series data structure for representing a univariate observation sequence.

use crate::core::frequency::Frequency;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// A univariate series of finite values with optional timestamps.
///
/// When timestamps are present they are strictly increasing and have the
/// same length as the values. A `Series` is immutable once built; the
/// analyzers and the forecast pipeline only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    timestamps: Option<Vec<DateTime<Utc>>>,
    values: Vec<f64>,
    frequency: Option<Frequency>,
}

/// Builder for constructing a [`Series`].
#[derive(Debug, Clone, Default)]
pub struct SeriesBuilder {
    timestamps: Option<Vec<DateTime<Utc>>>,
    values: Vec<f64>,
    frequency: Option<Frequency>,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = Some(timestamps);
        self
    }

    pub fn values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    /// Pin the sampling frequency instead of inferring it from timestamps.
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn build(self) -> Result<Series> {
        Series::validated(self.timestamps, self.values, self.frequency)
    }
}

impl Series {
    /// Create a timestamped series.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::validated(Some(timestamps), values, None)
    }

    /// Create a series indexed by position only.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        Self::validated(None, values, None)
    }

    pub fn builder() -> SeriesBuilder {
        SeriesBuilder::new()
    }

    fn validated(
        timestamps: Option<Vec<DateTime<Utc>>>,
        values: Vec<f64>,
        frequency: Option<Frequency>,
    ) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFiniteData);
        }

        if let Some(ts) = &timestamps {
            if ts.len() != values.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: values.len(),
                    got: ts.len(),
                });
            }
            if ts.windows(2).any(|w| w[1] <= w[0]) {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            timestamps,
            values,
            frequency,
        })
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a validated series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    pub fn has_timestamps(&self) -> bool {
        self.timestamps.is_some()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.as_ref().and_then(|ts| ts.last().copied())
    }

    /// Explicitly pinned frequency, if any.
    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    /// Pinned frequency, or the one inferred from the timestamps.
    pub fn resolved_frequency(&self) -> Result<Frequency> {
        match self.frequency {
            Some(freq) => Ok(freq),
            None => self.infer_frequency(0.5),
        }
    }

    /// Infer the sampling frequency from the timestamps.
    ///
    /// `tolerance` is the minimum share of spacings that must equal the
    /// modal spacing for a fixed-step frequency to be accepted.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        let ts = self.timestamps.as_deref().ok_or_else(|| {
            ForecastError::FrequencyInference("series has no timestamps".to_string())
        })?;
        Frequency::infer(ts, tolerance)
    }

    /// The last `n` observations (or the whole series when shorter).
    pub fn tail(&self, n: usize) -> Series {
        let start = self.len().saturating_sub(n);
        Series {
            timestamps: self.timestamps.as_ref().map(|ts| ts[start..].to_vec()),
            values: self.values[start..].to_vec(),
            frequency: self.frequency,
        }
    }

    /// Extract a sub-range of the series.
    pub fn slice(&self, start: usize, end: usize) -> Result<Series> {
        if start >= end {
            return Err(ForecastError::InvalidParameter(
                "start must be < end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::InsufficientData {
                needed: end,
                got: self.len(),
            });
        }
        Ok(Series {
            timestamps: self.timestamps.as_ref().map(|ts| ts[start..end].to_vec()),
            values: self.values[start..end].to_vec(),
            frequency: self.frequency,
        })
    }
}
