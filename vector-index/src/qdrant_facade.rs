//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind the
//! [`VectorIndex`] trait, hiding away the verbose builder pattern and keeping
//! the rest of the application decoupled from `qdrant-client`.

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{GetPointsBuilder, PointId, SearchParamsBuilder, SearchPointsBuilder};
use tracing::{debug, info};

use crate::backend::{BoxFuture, VectorIndex};
use crate::config::IndexConfig;
use crate::errors::IndexError;
use crate::mappers::{order_by_ids, retrieved_to_raw, scored_to_hit};
use crate::record::{RawPoint, RetrieveOptions, SearchHit, SearchParams};

/// A facade over the Qdrant client.
pub struct QdrantIndex {
    client: Qdrant,
}

impl QdrantIndex {
    /// Creates a new facade from the given configuration.
    ///
    /// Building the client does not touch the network; the first request
    /// (normally the startup probe) does.
    pub fn connect(cfg: &IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| IndexError::Backend(format!("client build: {e}")))?;

        info!("Qdrant client created for {}", cfg.qdrant_url);
        Ok(Self { client })
    }

    async fn search_impl(
        &self,
        collection: &str,
        vector: &[f32],
        limit: u64,
        params: SearchParams,
    ) -> Result<Vec<SearchHit>, IndexError> {
        debug!(
            "Searching in '{}' with limit={}, hnsw_ef={:?}, exact={}",
            collection, limit, params.hnsw_ef, params.exact
        );

        let mut qparams = SearchParamsBuilder::default().exact(params.exact);
        if let Some(ef) = params.hnsw_ef {
            qparams = qparams.hnsw_ef(ef);
        }

        let builder = SearchPointsBuilder::new(collection, vector.to_vec(), limit)
            .with_payload(true)
            .params(qparams);

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| IndexError::Backend(format!("search_points: {e}")))?;

        let hits: Vec<SearchHit> = res.result.into_iter().filter_map(scored_to_hit).collect();
        debug!("Search completed: {} hits returned", hits.len());
        Ok(hits)
    }

    async fn retrieve_impl(
        &self,
        collection: &str,
        ids: &[u64],
        opts: RetrieveOptions,
    ) -> Result<Vec<Option<RawPoint>>, IndexError> {
        debug!(
            "Retrieving {} ids from '{}' (vector={}, payload={})",
            ids.len(),
            collection,
            opts.with_vector,
            opts.with_payload
        );

        let point_ids: Vec<PointId> = ids.iter().copied().map(PointId::from).collect();
        let builder = GetPointsBuilder::new(collection, point_ids)
            .with_vectors(opts.with_vector)
            .with_payload(opts.with_payload);

        let res = self
            .client
            .get_points(builder)
            .await
            .map_err(|e| IndexError::Backend(format!("get_points: {e}")))?;

        let found: Vec<RawPoint> = res
            .result
            .into_iter()
            .filter_map(retrieved_to_raw)
            .collect();

        Ok(order_by_ids(ids, found))
    }

    async fn count_impl(&self, collection: &str) -> Result<u64, IndexError> {
        let res = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| IndexError::Backend(format!("collection_info: {e}")))?;

        let info = res.result.ok_or_else(|| {
            IndexError::Backend(format!("collection '{collection}' returned no info"))
        })?;

        Ok(info.points_count.unwrap_or(0))
    }
}

impl VectorIndex for QdrantIndex {
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: u64,
        params: SearchParams,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
        Box::pin(self.search_impl(collection, vector, limit, params))
    }

    fn retrieve<'a>(
        &'a self,
        collection: &'a str,
        ids: &'a [u64],
        opts: RetrieveOptions,
    ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
        Box::pin(self.retrieve_impl(collection, ids, opts))
    }

    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
        Box::pin(self.count_impl(collection))
    }
}
