//! Response records returned by the router and the resolver.

use serde::Serialize;
use vector_index::{Collection, Payload, SearchHit};

/// Label echoed back for upload searches, which have no query text or id.
pub const UPLOAD_QUERY_LABEL: &str = "uploaded_image";

#[derive(Debug, Clone, Serialize)]
pub struct TextSearchResult {
    pub query: String,
    pub results: Vec<SearchHit>,
}

/// Neighbours of an indexed image; never contains `query_id` itself.
#[derive(Debug, Clone, Serialize)]
pub struct VisualSearchResult {
    pub query_id: u64,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadSearchResult {
    /// Always [`UPLOAD_QUERY_LABEL`].
    pub query: &'static str,
    pub results: Vec<SearchHit>,
}

/// Metadata of one item and the collection it was found in.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedItem {
    pub id: u64,
    pub collection: Collection,
    pub payload: Payload,
}
