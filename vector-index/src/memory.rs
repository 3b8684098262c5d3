//! In-memory backend for tests.
//!
//! Brute-force cosine similarity; ties keep insertion order.

use std::collections::HashMap;

use serde_json::Value;

use crate::backend::{BoxFuture, VectorIndex};
use crate::errors::IndexError;
use crate::record::{Payload, RawPoint, RetrieveOptions, SearchHit, SearchParams};

#[derive(Default)]
pub struct MemoryIndex {
    collections: HashMap<String, Vec<RawPoint>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty collection.
    pub fn with_collection(mut self, collection: &str) -> Self {
        self.collections.entry(collection.to_string()).or_default();
        self
    }

    /// Adds (or replaces) a point.
    pub fn with_point(
        mut self,
        collection: &str,
        id: u64,
        vector: Vec<f32>,
        payload: Value,
    ) -> Self {
        let points = self.collections.entry(collection.to_string()).or_default();
        points.retain(|p| p.id != id);
        points.push(RawPoint {
            id,
            vector: Some(vector),
            payload: Payload::from(payload),
        });
        self
    }

    fn points(&self, collection: &str) -> Result<&[RawPoint], IndexError> {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .ok_or_else(|| IndexError::Backend(format!("collection '{collection}' not found")))
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl VectorIndex for MemoryIndex {
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: u64,
        _params: SearchParams,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
        Box::pin(async move {
            let mut hits: Vec<SearchHit> = self
                .points(collection)?
                .iter()
                .filter_map(|p| {
                    let v = p.vector.as_deref()?;
                    if v.len() != vector.len() {
                        return None;
                    }
                    Some(SearchHit {
                        id: p.id,
                        score: cosine(v, vector),
                        payload: p.payload.clone(),
                    })
                })
                .collect();
            // Stable sort keeps insertion order on ties.
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(limit as usize);
            Ok(hits)
        })
    }

    fn retrieve<'a>(
        &'a self,
        collection: &'a str,
        ids: &'a [u64],
        opts: RetrieveOptions,
    ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
        Box::pin(async move {
            let points = self.points(collection)?;
            Ok(ids
                .iter()
                .map(|id| {
                    points.iter().find(|p| p.id == *id).map(|p| RawPoint {
                        id: p.id,
                        vector: if opts.with_vector { p.vector.clone() } else { None },
                        payload: if opts.with_payload {
                            p.payload.clone()
                        } else {
                            Payload::default()
                        },
                    })
                })
                .collect())
        })
    }

    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
        Box::pin(async move { Ok(self.points(collection)?.len() as u64) })
    }
}
