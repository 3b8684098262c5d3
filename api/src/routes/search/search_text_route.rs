use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use search_core::TextSearchResult;
use tracing::debug;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::search::search_params::TextSearchParams,
};

/// `GET /search/text?q=&limit=`
pub async fn search_text_route(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TextSearchParams>, QueryRejection>,
) -> AppResult<Json<TextSearchResult>> {
    let Query(p) = params?;
    let limit = state.limit(p.limit);
    debug!(query = %p.q, limit, "search_text_route: start");

    let out = state
        .router
        .search_by_text(&p.q, limit)
        .await
        .map_err(|e| state.fail(e))?;

    debug!(hits = out.results.len(), "search_text_route: success");
    Ok(Json(out))
}
