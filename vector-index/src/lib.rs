//! Typed access to the two vector collections.
//!
//! This crate provides:
//! - The data model (vector spaces, embeddings, items, hits, payloads)
//! - A Qdrant-backed [`VectorIndex`] implementation
//! - [`IndexRegistry`], which holds the process-wide index handle and scopes
//!   every search/retrieve to the collection of the caller's vector space
//!
//! The registry is opened once at startup. If the startup probe fails the
//! registry stays in degraded mode and every call returns
//! [`IndexError::Unavailable`]; there is no reload path.

mod backend;
mod config;
mod errors;
mod mappers;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod qdrant_facade;
mod record;
mod space;

pub use backend::{BoxFuture, VectorIndex};
pub use config::{CollectionNames, IndexConfig};
pub use errors::IndexError;
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryIndex;
pub use qdrant_facade::QdrantIndex;
pub use record::{
    CollectionInfo, Item, Payload, RawPoint, RetrieveOptions, SearchHit, SearchParams,
};
pub use space::{Collection, Embedding, PureVisual, TextVisual, VectorSpace};

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

/// Process-wide handle to both collections.
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct IndexRegistry {
    backend: Option<Arc<dyn VectorIndex>>,
    names: CollectionNames,
}

impl IndexRegistry {
    /// Connects to Qdrant and probes both collections.
    ///
    /// Never fails: any error is logged and yields a degraded registry.
    pub async fn open(cfg: &IndexConfig) -> Self {
        info!("Opening vector index at {}", cfg.qdrant_url);
        match QdrantIndex::connect(cfg) {
            Ok(client) => Self::bootstrap(Arc::new(client), cfg.collections.clone()).await,
            Err(err) => {
                warn!("Could not create index client: {err}; starting degraded");
                Self::degraded(cfg.collections.clone())
            }
        }
    }

    /// Probes both collections on `backend`; degraded if either probe fails.
    pub async fn bootstrap(backend: Arc<dyn VectorIndex>, names: CollectionNames) -> Self {
        for collection in [Collection::TextVisual, Collection::PureVisual] {
            let name = names.name(collection);
            match backend.count(name).await {
                Ok(0) => warn!("Collection '{name}' is empty; searches will return no results"),
                Ok(n) => info!("Found collection '{name}' with {n} points."),
                Err(err) => {
                    warn!("Could not load collection '{name}': {err}; starting degraded");
                    return Self::degraded(names);
                }
            }
        }
        info!("Vector index loaded successfully");
        Self {
            backend: Some(backend),
            names,
        }
    }

    /// Registry with no backend; every operation is `Unavailable`.
    pub fn degraded(names: CollectionNames) -> Self {
        Self {
            backend: None,
            names,
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&dyn VectorIndex, IndexError> {
        self.backend.as_deref().ok_or(IndexError::Unavailable)
    }

    /// Similarity search in the collection of space `S`.
    ///
    /// `params = None` uses [`SearchParams::default`].
    ///
    /// # Errors
    /// `Unavailable` in degraded mode, `InvalidLimit` for `limit == 0`,
    /// `Backend` on engine failures.
    pub async fn search<S: VectorSpace>(
        &self,
        vector: &Embedding<S>,
        limit: u64,
        params: Option<SearchParams>,
    ) -> Result<Vec<SearchHit>, IndexError> {
        let backend = self.backend()?;
        if limit == 0 {
            return Err(IndexError::InvalidLimit(limit));
        }
        let name = self.names.name(S::COLLECTION);
        trace!("IndexRegistry::search collection={name} limit={limit}");
        backend
            .search(name, vector.as_slice(), limit, params.unwrap_or_default())
            .await
    }

    /// Fetches items by id from the collection of space `S`.
    ///
    /// Returns one slot per id, in input order; `None` for absent ids.
    pub async fn retrieve<S: VectorSpace>(
        &self,
        ids: &[u64],
        opts: RetrieveOptions,
    ) -> Result<Vec<Option<Item<S>>>, IndexError> {
        let backend = self.backend()?;
        let name = self.names.name(S::COLLECTION);
        trace!("IndexRegistry::retrieve collection={name} ids={}", ids.len());
        let points = backend.retrieve(name, ids, opts).await?;
        debug!(
            "IndexRegistry::retrieve collection={name} found={}",
            points.iter().filter(|p| p.is_some()).count()
        );
        Ok(points
            .into_iter()
            .map(|p| p.map(RawPoint::into_item::<S>))
            .collect())
    }

    /// Item count of one collection.
    pub async fn collection_info(
        &self,
        collection: Collection,
    ) -> Result<CollectionInfo, IndexError> {
        let backend = self.backend()?;
        let name = self.names.name(collection);
        let item_count = backend.count(name).await?;
        Ok(CollectionInfo {
            collection,
            name: name.to_string(),
            item_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Unreachable;

    impl VectorIndex for Unreachable {
        fn search<'a>(
            &'a self,
            _: &'a str,
            _: &'a [f32],
            _: u64,
            _: SearchParams,
        ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
            Box::pin(async { Err(IndexError::Backend("connection refused".into())) })
        }

        fn retrieve<'a>(
            &'a self,
            _: &'a str,
            _: &'a [u64],
            _: RetrieveOptions,
        ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
            Box::pin(async { Err(IndexError::Backend("connection refused".into())) })
        }

        fn count<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
            Box::pin(async { Err(IndexError::Backend("connection refused".into())) })
        }
    }

    fn memory() -> MemoryIndex {
        MemoryIndex::new()
            .with_point("text_visual_index", 1, vec![1.0, 0.0], json!({"url": "t1"}))
            .with_point("pure_visual_index", 1, vec![0.0, 1.0, 0.0], json!({"url": "v1"}))
            .with_point("pure_visual_index", 2, vec![0.0, 0.9, 0.1], json!({"url": "v2"}))
    }

    #[tokio::test]
    async fn failed_probe_degrades() {
        let reg = IndexRegistry::bootstrap(Arc::new(Unreachable), CollectionNames::default()).await;
        assert!(!reg.is_available());
        let v = Embedding::<TextVisual>::new(vec![1.0]);
        assert!(matches!(reg.search(&v, 5, None).await, Err(IndexError::Unavailable)));
        assert!(matches!(
            reg.retrieve::<PureVisual>(&[1], RetrieveOptions::VECTOR_ONLY).await,
            Err(IndexError::Unavailable)
        ));
        assert!(matches!(
            reg.collection_info(Collection::PureVisual).await,
            Err(IndexError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn missing_collection_degrades() {
        let backend = MemoryIndex::new().with_collection("text_visual_index");
        let reg = IndexRegistry::bootstrap(Arc::new(backend), CollectionNames::default()).await;
        assert!(!reg.is_available());
    }

    #[tokio::test]
    async fn empty_collections_stay_available() {
        let backend = MemoryIndex::new()
            .with_collection("text_visual_index")
            .with_collection("pure_visual_index");
        let reg = IndexRegistry::bootstrap(Arc::new(backend), CollectionNames::default()).await;
        assert!(reg.is_available());
        let info = reg.collection_info(Collection::TextVisual).await.unwrap();
        assert_eq!(info.item_count, 0);
    }

    #[tokio::test]
    async fn search_is_scoped_by_space() {
        let reg = IndexRegistry::bootstrap(Arc::new(memory()), CollectionNames::default()).await;
        let v = Embedding::<PureVisual>::new(vec![0.0, 1.0, 0.0]);
        let hits = reg.search(&v, 10, Some(SearchParams::visual())).await.unwrap();
        let urls: Vec<_> = hits.iter().filter_map(|h| h.payload.url()).collect();
        assert_eq!(urls, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn zero_limit_is_rejected() {
        let reg = IndexRegistry::bootstrap(Arc::new(memory()), CollectionNames::default()).await;
        let v = Embedding::<TextVisual>::new(vec![1.0, 0.0]);
        assert!(matches!(reg.search(&v, 0, None).await, Err(IndexError::InvalidLimit(0))));
    }

    #[tokio::test]
    async fn retrieve_keeps_slots_and_types_vectors() {
        let reg = IndexRegistry::bootstrap(Arc::new(memory()), CollectionNames::default()).await;
        let items = reg
            .retrieve::<PureVisual>(&[2, 99, 1], RetrieveOptions::VECTOR_ONLY)
            .await
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().map(|i| i.id), Some(2));
        assert!(items[1].is_none());
        let first = items[2].as_ref().unwrap();
        assert_eq!(first.vector.as_ref().map(|v| v.dim()), Some(3));
        assert!(first.payload.is_empty());
    }

    #[tokio::test]
    async fn payload_only_retrieve_has_no_vector() {
        let reg = IndexRegistry::bootstrap(Arc::new(memory()), CollectionNames::default()).await;
        let items = reg
            .retrieve::<TextVisual>(&[1], RetrieveOptions::PAYLOAD_ONLY)
            .await
            .unwrap();
        let item = items[0].as_ref().unwrap();
        assert!(item.vector.is_none());
        assert_eq!(item.payload.url(), Some("t1"));
    }
}
