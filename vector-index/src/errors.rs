//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The index handle was never opened (startup probe failed).
    #[error("vector index is unavailable")]
    Unavailable,

    /// `limit` must be a positive integer.
    #[error("invalid limit: {0} (must be > 0)")]
    InvalidLimit(u64),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Qdrant client / transport errors (wrapped).
    #[error("index backend error: {0}")]
    Backend(String),
}
