//! Error types for the Stirling engine and the parameter estimator.
//!
//! `InvalidArgument` and `PrecisionLoss` reach the caller. `Overflow` is
//! normally absorbed by the engine, which retries in log space, and only
//! escapes when even the log-space result does not fit an `f64`. `CacheIo`
//! is produced by the disk cache; the engine logs it and keeps computing.

use thiserror::Error;

/// Errors produced while evaluating generalized Stirling numbers.
#[derive(Debug, Error)]
pub enum StirlingError {
    /// Arguments outside the domain of the requested operation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A direct (non-log) evaluation left the range of `f64`.
    #[error("numeric overflow in {0}")]
    Overflow(String),

    /// An alternating sum cancelled too many significant digits.
    #[error(
        "precision loss while computing S({n},{k}): cancellation ratio {ratio:e}, \
         estimated relative error {estimated_error:e}"
    )]
    PrecisionLoss {
        n: u64,
        k: u64,
        ratio: f64,
        estimated_error: f64,
    },

    /// Disk cache read or write failure.
    #[error("cache I/O error: {0}")]
    CacheIo(String),
}

impl StirlingError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StirlingError::InvalidArgument(msg.into())
    }

    pub fn overflow(what: impl Into<String>) -> Self {
        StirlingError::Overflow(what.into())
    }

    /// Whether a log-space retry may recover from this error.
    pub fn is_overflow(&self) -> bool {
        matches!(self, StirlingError::Overflow(_))
    }
}

impl From<std::io::Error> for StirlingError {
    fn from(e: std::io::Error) -> Self {
        StirlingError::CacheIo(e.to_string())
    }
}

impl From<serde_json::Error> for StirlingError {
    fn from(e: serde_json::Error) -> Self {
        StirlingError::CacheIo(format!("malformed entry: {}", e))
    }
}

/// Errors produced by [`estimate_parameters`][crate::estimate::estimate_parameters].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    /// Fewer than two linearly independent observations.
    #[error("insufficient data: {got} observations, at least {required} independent ones required")]
    InsufficientData { got: usize, required: usize },

    /// An observation carries a NaN or infinite measure.
    #[error("observation #{index} has a non-finite measure")]
    InvalidObservation { index: usize },
}

pub type Result<T, E = StirlingError> = std::result::Result<T, E>;
