//! Query Router: the three search protocols.
//!
//! - **Text** → joint text/visual collection, hits verbatim.
//! - **Visual by id** → fetch the item's own vector from the pure visual
//!   collection, search its neighbours, drop the item itself.
//! - **Upload** → embed the uploaded image, search the pure visual collection.
//!
//! Each call is a stateless request → response transformation; the router
//! only holds shared read-only handles, so concurrent calls need no locking.

use std::{sync::Arc, time::Duration};

use embed_gateway::{EmbeddingGateway, image_input::is_image_mime};
use tracing::{debug, warn};
use vector_index::{IndexRegistry, PureVisual, RetrieveOptions, SearchParams};

use crate::{
    bounded,
    errors::SearchError,
    results::{TextSearchResult, UPLOAD_QUERY_LABEL, UploadSearchResult, VisualSearchResult},
};

pub const DEFAULT_MAX_LIMIT: u64 = 100;
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(10);

/// Router behaviour knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Largest accepted `limit`.
    pub max_limit: u64,
    /// Visual-by-id search asks for `limit + 1` neighbours so that dropping
    /// the query item still leaves `limit` results.
    pub backfill_self_exclusion: bool,
    /// Budget for each index call.
    pub index_timeout: Duration,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_limit: DEFAULT_MAX_LIMIT,
            backfill_self_exclusion: false,
            index_timeout: DEFAULT_INDEX_TIMEOUT,
        }
    }
}

/// Dispatches the three query protocols.
pub struct QueryRouter {
    gateway: Option<Arc<EmbeddingGateway>>,
    registry: Arc<IndexRegistry>,
    opts: RouterOptions,
}

impl QueryRouter {
    /// `gateway = None` means the encoders could not be initialised; the
    /// encoder-backed protocols then report `ServiceUnavailable`.
    pub fn new(
        gateway: Option<Arc<EmbeddingGateway>>,
        registry: Arc<IndexRegistry>,
        opts: RouterOptions,
    ) -> Self {
        Self {
            gateway,
            registry,
            opts,
        }
    }

    /// Text → image search in the joint collection.
    ///
    /// # Errors
    /// `Validation` for empty `q` or an out-of-range `limit`,
    /// `ServiceUnavailable` if the index or the encoders are not loaded.
    pub async fn search_by_text(
        &self,
        q: &str,
        limit: u64,
    ) -> Result<TextSearchResult, SearchError> {
        if q.trim().is_empty() {
            return Err(SearchError::Validation("query 'q' must not be empty".into()));
        }
        self.check_limit(limit)?;
        self.ensure_index()?;
        let gateway = self.gateway()?;

        let vector = gateway.embed_text(q).await?;
        let results = bounded(
            self.opts.index_timeout,
            self.registry.search(&vector, limit, None),
        )
        .await?;

        debug!(query = %q, limit, hits = results.len(), "text search done");
        Ok(TextSearchResult {
            query: q.to_string(),
            results,
        })
    }

    /// Neighbours of an indexed image, excluding the image itself.
    ///
    /// Without backfill the result may hold `limit - 1` hits when the index
    /// returned the query item among the top `limit`.
    ///
    /// # Errors
    /// `NotFound` if `image_id` is not in the pure visual collection.
    pub async fn search_by_visual(
        &self,
        image_id: u64,
        limit: u64,
    ) -> Result<VisualSearchResult, SearchError> {
        self.check_limit(limit)?;

        let found = bounded(
            self.opts.index_timeout,
            self.registry
                .retrieve::<PureVisual>(&[image_id], RetrieveOptions::VECTOR_ONLY),
        )
        .await?;
        let item = found
            .into_iter()
            .next()
            .flatten()
            .ok_or_else(|| SearchError::NotFound(format!("image {image_id} not found")))?;
        let vector = item.vector.ok_or_else(|| {
            SearchError::Internal(format!("image {image_id} is stored without a vector"))
        })?;

        let fetch = if self.opts.backfill_self_exclusion {
            limit + 1
        } else {
            limit
        };
        let hits = bounded(
            self.opts.index_timeout,
            self.registry.search(&vector, fetch, Some(SearchParams::visual())),
        )
        .await?;

        let mut results: Vec<_> = hits.into_iter().filter(|h| h.id != image_id).collect();
        results.truncate(limit as usize);

        debug!(image_id, limit, fetch, hits = results.len(), "visual search done");
        Ok(VisualSearchResult {
            query_id: image_id,
            results,
        })
    }

    /// Image → image search for an uploaded file.
    ///
    /// # Errors
    /// `Validation` if `mime` is not an image type; no encoder call is made.
    pub async fn search_by_upload(
        &self,
        bytes: &[u8],
        mime: &str,
        limit: u64,
    ) -> Result<UploadSearchResult, SearchError> {
        if !is_image_mime(mime) {
            return Err(SearchError::Validation(format!(
                "uploaded file must be an image, got '{mime}'"
            )));
        }
        self.check_limit(limit)?;
        self.ensure_index()?;
        let gateway = self.gateway()?;

        let vector = gateway.embed_image(bytes, mime).await?;
        let results = bounded(
            self.opts.index_timeout,
            self.registry.search(&vector, limit, Some(SearchParams::visual())),
        )
        .await?;

        debug!(bytes = bytes.len(), limit, hits = results.len(), "upload search done");
        Ok(UploadSearchResult {
            query: UPLOAD_QUERY_LABEL,
            results,
        })
    }

    fn check_limit(&self, limit: u64) -> Result<(), SearchError> {
        if (1..=self.opts.max_limit).contains(&limit) {
            Ok(())
        } else {
            Err(SearchError::Validation(format!(
                "limit must be between 1 and {}, got {limit}",
                self.opts.max_limit
            )))
        }
    }

    // Checked before encoding so a degraded index costs no encoder call.
    fn ensure_index(&self) -> Result<(), SearchError> {
        if self.registry.is_available() {
            Ok(())
        } else {
            Err(SearchError::ServiceUnavailable("vector index is not loaded".into()))
        }
    }

    fn gateway(&self) -> Result<&EmbeddingGateway, SearchError> {
        self.gateway.as_deref().ok_or_else(|| {
            warn!("encoders are not initialised");
            SearchError::ServiceUnavailable("encoder models are not loaded".into())
        })
    }
}
