//! Mappers turning Qdrant wire types into the crate's records.

use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::vector_output::Vector as VectorKind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    PointId, RetrievedPoint, ScoredPoint, Value as QValue, VectorOutput, VectorsOutput,
};
use tracing::warn;

use crate::record::{Payload, RawPoint, SearchHit};

/// Maps a scored point into a [`SearchHit`].
///
/// Points with UUID ids cannot be addressed by this service and are skipped.
pub fn scored_to_hit(sp: ScoredPoint) -> Option<SearchHit> {
    let Some(id) = numeric_id(sp.id) else {
        warn!("skipping hit without numeric id (score={})", sp.score);
        return None;
    };
    Some(SearchHit {
        id,
        score: sp.score,
        payload: qpayload_to_payload(sp.payload),
    })
}

/// Maps a retrieved point into a [`RawPoint`].
pub fn retrieved_to_raw(rp: RetrievedPoint) -> Option<RawPoint> {
    let id = numeric_id(rp.id)?;
    Some(RawPoint {
        id,
        vector: dense_vector(rp.vectors),
        payload: qpayload_to_payload(rp.payload),
    })
}

/// Lays out `found` points in the order of `ids`, `None` where missing.
///
/// Qdrant returns retrieved points in its own order and omits unknown ids.
pub fn order_by_ids(ids: &[u64], found: Vec<RawPoint>) -> Vec<Option<RawPoint>> {
    let by_id: HashMap<u64, RawPoint> = found.into_iter().map(|p| (p.id, p)).collect();
    ids.iter().map(|id| by_id.get(id).cloned()).collect()
}

fn numeric_id(pid: Option<PointId>) -> Option<u64> {
    match pid?.point_id_options? {
        PointIdOptions::Num(n) => Some(n),
        PointIdOptions::Uuid(_) => None,
    }
}

/// Extracts the unnamed dense vector, or the only named one.
fn dense_vector(v: Option<VectorsOutput>) -> Option<Vec<f32>> {
    match v?.vectors_options? {
        VectorsOptions::Vector(out) => dense_from_output(out),
        VectorsOptions::Vectors(named) => {
            if named.vectors.len() != 1 {
                warn!(
                    "point has {} named vectors; expected exactly one",
                    named.vectors.len()
                );
                return None;
            }
            named.vectors.into_values().next().and_then(dense_from_output)
        }
    }
}

#[allow(deprecated)]
fn dense_from_output(out: VectorOutput) -> Option<Vec<f32>> {
    match out.vector {
        Some(VectorKind::Dense(d)) => Some(d.data),
        Some(_) => None,
        // Older servers only fill the legacy flat field.
        None if !out.data.is_empty() => Some(out.data),
        None => None,
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
fn qpayload_to_payload(p: HashMap<String, QValue>) -> Payload {
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        m.insert(k, v.into_json());
    }
    Payload(m)
}
