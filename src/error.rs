//! Error types.
//!
//! Two layers:
//!
//! - [`FitError`]: caller errors surfaced immediately (bad bounds, unknown family,
//!   selecting from an empty table, ...).
//! - [`CandidateFailure`]: per-candidate failures inside a batch. These are
//!   recorded in the result table and logged, never returned from the batch.

use std::time::Duration;

use thiserror::Error;

/// Caller-facing errors of the fitting engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// Inclusion bounds inverted, non-finite, or selecting no observations.
    #[error("Invalid inclusion range: {0}")]
    InvalidRange(String),

    /// The raw sample is empty or contains non-finite values.
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// A configuration value could not be parsed or is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A candidate identifier is not present in the catalog.
    #[error("Unknown distribution family '{0}'")]
    UnknownFamily(String),

    /// Best-candidate selection on an empty or all-failed table.
    #[error("No successfully fitted distribution to select by {0}")]
    EmptyResult(String),

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Why a single candidate was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandidateFailure {
    #[error("taking more than {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("estimation failed: {0}")]
    Estimation(String),

    #[error("estimator panicked")]
    Panicked,

    #[error("scoring failed: {0}")]
    Scoring(String),
}

/// Errors reported by an estimator's `fit`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// The cancellation token fired before the estimate converged.
    #[error("cancelled")]
    Cancelled,

    #[error("diverged: {0}")]
    Diverged(String),

    #[error("degenerate sample: {0}")]
    DegenerateSample(String),
}

impl From<EstimateError> for CandidateFailure {
    fn from(value: EstimateError) -> Self {
        CandidateFailure::Estimation(value.to_string())
    }
}
