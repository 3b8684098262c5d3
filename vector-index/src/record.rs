//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::space::{Collection, Embedding, VectorSpace};

/// Metadata stored next to a vector (e.g. `url`, `description`).
///
/// Kept as an open JSON object because the ingestion side owns its fields;
/// the two fields the UI relies on have typed accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(pub Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Image URL, if present.
    pub fn url(&self) -> Option<&str> {
        self.get("url").and_then(Value::as_str)
    }

    /// Human description, if present.
    pub fn description(&self) -> Option<&str> {
        self.get("description").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Value> for Payload {
    /// Non-object values become an empty payload.
    fn from(v: Value) -> Self {
        match v {
            Value::Object(m) => Payload(m),
            _ => Payload::default(),
        }
    }
}

/// A single similarity hit, in the order the index returned it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: u64,
    pub score: f32,
    pub payload: Payload,
}

/// A stored item as seen from one collection.
///
/// `vector` is `None` when it was not requested, which is distinct from a
/// zero vector.
#[derive(Clone, Debug)]
pub struct Item<S: VectorSpace> {
    pub id: u64,
    pub vector: Option<Embedding<S>>,
    pub payload: Payload,
}

/// Untyped point as returned by a backend, before the registry tags it
/// with its vector space.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPoint {
    pub id: u64,
    pub vector: Option<Vec<f32>>,
    pub payload: Payload,
}

impl RawPoint {
    pub(crate) fn into_item<S: VectorSpace>(self) -> Item<S> {
        Item {
            id: self.id,
            vector: self.vector.map(Embedding::new),
            payload: self.payload,
        }
    }
}

/// Approximate-search knobs.
///
/// `SearchParams::default()` leaves `hnsw_ef` to the server and keeps ANN
/// search (`exact = false`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// HNSW search breadth; larger values trade latency for recall.
    pub hnsw_ef: Option<u64>,
    /// Brute-force search instead of HNSW.
    pub exact: bool,
}

impl SearchParams {
    /// Breadth used by every image-to-image query.
    pub const VISUAL_HNSW_EF: u64 = 128;

    /// Parameters for pure-visual searches: `hnsw_ef = 128`, ANN.
    pub fn visual() -> Self {
        Self {
            hnsw_ef: Some(Self::VISUAL_HNSW_EF),
            exact: false,
        }
    }
}

/// Which parts of a point `retrieve` should return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetrieveOptions {
    pub with_vector: bool,
    pub with_payload: bool,
}

impl RetrieveOptions {
    pub const VECTOR_ONLY: Self = Self {
        with_vector: true,
        with_payload: false,
    };

    pub const PAYLOAD_ONLY: Self = Self {
        with_vector: false,
        with_payload: true,
    };
}

/// Summary returned by the startup probe.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub collection: Collection,
    pub name: String,
    pub item_count: u64,
}
