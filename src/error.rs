//! Error types for the tsforecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during forecasting operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the requested order or horizon.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// NaN or infinite values in the input.
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// The estimation engine could not fit or forecast a given model.
    #[error("estimation failed for {model}: {reason}")]
    EstimationFailure { model: String, reason: String },

    /// A metric is undefined for the supplied data (e.g. MAPE with a zero actual).
    #[error("degenerate metric: {0}")]
    DegenerateMetric(String),

    /// Every candidate in an order search failed to fit.
    #[error("order search exhausted: all {candidates} candidates failed")]
    SearchExhausted { candidates: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl ForecastError {
    /// Shorthand for an [`ForecastError::EstimationFailure`].
    pub fn estimation(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EstimationFailure {
            model: model.into(),
            reason: reason.into(),
        }
    }
}
