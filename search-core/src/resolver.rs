//! Metadata Resolver: id → payload lookup across both collections.
//!
//! Probe order is fixed: the joint collection first, then the pure visual
//! one. Ids are not guaranteed distinct across collections, so an id present
//! in both resolves to the joint collection's payload.

use std::{sync::Arc, time::Duration};

use tracing::debug;
use vector_index::{Collection, IndexRegistry, PureVisual, RetrieveOptions, TextVisual};

use crate::{bounded, errors::SearchError, results::ResolvedItem};

pub struct MetadataResolver {
    registry: Arc<IndexRegistry>,
    index_timeout: Duration,
}

impl MetadataResolver {
    pub fn new(registry: Arc<IndexRegistry>, index_timeout: Duration) -> Self {
        Self {
            registry,
            index_timeout,
        }
    }

    /// # Errors
    /// `NotFound` if neither collection holds `image_id`,
    /// `ServiceUnavailable` in degraded mode.
    pub async fn resolve(&self, image_id: u64) -> Result<ResolvedItem, SearchError> {
        let ids = [image_id];

        let joint = bounded(
            self.index_timeout,
            self.registry
                .retrieve::<TextVisual>(&ids, RetrieveOptions::PAYLOAD_ONLY),
        )
        .await?;
        if let Some(item) = joint.into_iter().next().flatten() {
            debug!(image_id, collection = %Collection::TextVisual, "resolved item");
            return Ok(ResolvedItem {
                id: item.id,
                collection: Collection::TextVisual,
                payload: item.payload,
            });
        }

        let visual = bounded(
            self.index_timeout,
            self.registry
                .retrieve::<PureVisual>(&ids, RetrieveOptions::PAYLOAD_ONLY),
        )
        .await?;
        if let Some(item) = visual.into_iter().next().flatten() {
            debug!(image_id, collection = %Collection::PureVisual, "resolved item");
            return Ok(ResolvedItem {
                id: item.id,
                collection: Collection::PureVisual,
                payload: item.payload,
            });
        }

        Err(SearchError::NotFound(format!("image {image_id} not found")))
    }
}
