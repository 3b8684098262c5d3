use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use search_core::VisualSearchResult;
use tracing::debug;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::search::search_params::LimitParams,
};

/// `GET /search/visual/{image_id}?limit=`
pub async fn search_visual_route(
    State(state): State<Arc<AppState>>,
    image_id: Result<Path<u64>, PathRejection>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> AppResult<Json<VisualSearchResult>> {
    let Path(image_id) = image_id?;
    let Query(p) = params?;
    let limit = state.limit(p.limit);
    debug!(image_id, limit, "search_visual_route: start");

    let out = state
        .router
        .search_by_visual(image_id, limit)
        .await
        .map_err(|e| state.fail(e))?;

    debug!(image_id, hits = out.results.len(), "search_visual_route: success");
    Ok(Json(out))
}
