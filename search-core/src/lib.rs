//! Query-side core of the multimodal search service.
//!
//! - [`QueryRouter`] runs the text, visual-by-id and upload search protocols
//! - [`MetadataResolver`] looks an id up across both collections
//! - [`SearchError`] is the taxonomy every failure is reduced to

mod errors;
#[cfg(test)]
mod fixtures;
mod resolver;
mod results;
mod router;

pub use errors::SearchError;
pub use resolver::MetadataResolver;
pub use results::{
    ResolvedItem, TextSearchResult, UPLOAD_QUERY_LABEL, UploadSearchResult, VisualSearchResult,
};
pub use router::{DEFAULT_INDEX_TIMEOUT, DEFAULT_MAX_LIMIT, QueryRouter, RouterOptions};

use std::{future::Future, time::Duration};

use vector_index::IndexError;

/// Runs one index call under `timeout`.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, IndexError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(res) => res.map_err(SearchError::from),
        Err(_) => Err(SearchError::Timeout(timeout)),
    }
}
