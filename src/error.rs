//! Error types for nearport operations.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NearportError>;

/// Errors surfaced by nearport.
///
/// Every failure here is a deterministic function of its input: there is no
/// I/O retry logic and no transient condition. Queries that can legitimately
/// match nothing (empty index, `k == 0`, non-positive radius) return empty
/// results rather than an error.
#[derive(Debug, Error)]
pub enum NearportError {
    /// A latitude or longitude was outside its valid range at `Point`
    /// construction.
    #[error("invalid {axis}: {value} (must be within [{min}, {max}])")]
    InvalidCoordinate {
        /// Which axis was out of range ("latitude" or "longitude").
        axis: &'static str,
        /// The offending value.
        value: f64,
        /// Lower bound of the valid range.
        min: f64,
        /// Upper bound of the valid range.
        max: f64,
    },

    /// A dataset record could not be parsed.
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord {
        /// 1-based line number within the dataset.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },

    /// An I/O error while reading a dataset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
