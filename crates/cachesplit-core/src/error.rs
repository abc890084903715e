//! Error types for cache split search

use thiserror::Error;

/// Error raised by the split search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The token sequence has no positions.
    #[error("sequence length must be positive")]
    EmptySequence,

    /// The sweep was asked to try no split counts at all.
    #[error("maximum split count must be at least 1")]
    NoSplitCounts,

    /// The worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Error raised while generating or replaying a policy workload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// Token length range is empty or starts at zero.
    #[error("invalid token range {min}..={max}")]
    InvalidTokenRange { min: u64, max: u64 },
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
