//! Errors raised when deriving statistics from a reduced record.
//!
//! The reduction itself never fails: invalid inputs are absorbed as the
//! identity element. Failure is deferred to post-processing, where a mean
//! or variance of too few values is undefined rather than `0 / 0`.

use thiserror::Error;

/// Errors returned by [`crate::Summary`] construction and the drivers that
/// produce one.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    /// The record holds no valid values, so no statistic is defined.
    #[error("no valid values: mean and variance are undefined")]
    Empty,

    /// Fewer values than the statistic needs.
    #[error("{statistic} requires at least {required} values, got {actual}")]
    InsufficientSamples {
        /// Name of the requested statistic.
        statistic: &'static str,
        /// Minimum number of valid values.
        required: u64,
        /// Number of valid values in the record.
        actual: u64,
    },
}
