//! Request-level error taxonomy.

use std::time::Duration;

use embed_gateway::EmbedError;
use thiserror::Error;
use vector_index::IndexError;

/// Every failure a search or lookup can surface to the caller.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Bad or missing input.
    #[error("{0}")]
    Validation(String),

    /// The requested id is absent.
    #[error("{0}")]
    NotFound(String),

    /// Index or encoders were not initialised at startup.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// An encoder or index call exceeded its time budget.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Unexpected failure in an encoder or index call.
    #[error("{0}")]
    Internal(String),
}

impl SearchError {
    /// `true` for failures whose details should not reach clients.
    pub fn is_internal(&self) -> bool {
        matches!(self, SearchError::Internal(_))
    }
}

impl From<IndexError> for SearchError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Unavailable => {
                SearchError::ServiceUnavailable("vector index is not loaded".into())
            }
            IndexError::InvalidLimit(n) => {
                SearchError::Validation(format!("limit must be a positive integer, got {n}"))
            }
            other => SearchError::Internal(other.to_string()),
        }
    }
}

impl From<EmbedError> for SearchError {
    fn from(err: EmbedError) -> Self {
        match err {
            EmbedError::InvalidInput(msg) => SearchError::Validation(msg),
            EmbedError::Timeout(d) => SearchError::Timeout(d),
            other => SearchError::Internal(other.to_string()),
        }
    }
}
