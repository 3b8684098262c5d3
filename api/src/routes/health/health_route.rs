use std::sync::Arc;

use axum::{Json, extract::State};
use tokio::time::timeout;
use tracing::{debug, warn};
use vector_index::Collection;

use crate::{
    core::app_state::AppState,
    routes::health::health_response::{EncoderHealth, HealthResponse, IndexHealth},
};

/// `GET /health`: index availability, collection sizes and encoder probes.
///
/// Always answers 200; the `status` field carries the verdict. Each
/// collection lookup gets the same budget as a search call.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let budget = state.config.router.index_timeout;
    let mut collections = Vec::with_capacity(2);
    if state.registry.is_available() {
        for collection in [Collection::TextVisual, Collection::PureVisual] {
            match timeout(budget, state.registry.collection_info(collection)).await {
                Ok(Ok(info)) => collections.push(info),
                Ok(Err(err)) => warn!(%collection, "health: collection info failed: {err}"),
                Err(_) => warn!(%collection, "health: collection info timed out after {budget:?}"),
            }
        }
    }

    let probes = match (&state.gateway, &state.health) {
        (Some(gw), Some(svc)) => svc.check_all(gw.probe_targets()).await,
        _ => Vec::new(),
    };

    let index_ok = state.registry.is_available() && collections.len() == 2;
    let encoders_ok = state.gateway.is_some() && probes.iter().all(|p| p.ok);
    let status = if index_ok && encoders_ok { "ok" } else { "degraded" };
    debug!(status, index_ok, encoders_ok, "health_route");

    Json(HealthResponse {
        status,
        index: IndexHealth {
            available: state.registry.is_available(),
            collections,
        },
        encoders: EncoderHealth {
            loaded: state.gateway.is_some(),
            probes,
        },
    })
}
