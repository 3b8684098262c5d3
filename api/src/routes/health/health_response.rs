use embed_gateway::HealthStatus;
use serde::Serialize;
use vector_index::CollectionInfo;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the index and all encoders are up, `"degraded"` otherwise.
    pub status: &'static str,
    pub index: IndexHealth,
    pub encoders: EncoderHealth,
}

#[derive(Debug, Serialize)]
pub struct IndexHealth {
    pub available: bool,
    pub collections: Vec<CollectionInfo>,
}

#[derive(Debug, Serialize)]
pub struct EncoderHealth {
    pub loaded: bool,
    pub probes: Vec<HealthStatus>,
}
