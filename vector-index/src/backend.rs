//! Storage backend abstraction.
//!
//! Backends work on untyped vectors and collection names; the
//! [`IndexRegistry`](crate::IndexRegistry) adds the vector-space typing.

use std::{future::Future, pin::Pin};

use crate::errors::IndexError;
use crate::record::{RawPoint, RetrieveOptions, SearchHit, SearchParams};

/// Boxed future returned by backend calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read-only vector index service.
///
/// Implement this trait to plug in a different storage engine.
pub trait VectorIndex: Send + Sync {
    /// Similarity search; hits ordered as the engine ranks them.
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: u64,
        params: SearchParams,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>>;

    /// Fetches points by id; one slot per requested id, in input order.
    fn retrieve<'a>(
        &'a self,
        collection: &'a str,
        ids: &'a [u64],
        opts: RetrieveOptions,
    ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>>;

    /// Number of points stored in a collection.
    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<u64, IndexError>>;
}
