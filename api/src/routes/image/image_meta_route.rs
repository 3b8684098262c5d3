use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use search_core::ResolvedItem;
use tracing::debug;

use crate::{core::app_state::AppState, error_handler::AppResult};

/// `GET /image/{image_id}`: payload of an item from whichever collection holds it.
pub async fn image_meta_route(
    State(state): State<Arc<AppState>>,
    image_id: Result<Path<u64>, PathRejection>,
) -> AppResult<Json<ResolvedItem>> {
    let Path(image_id) = image_id?;
    let item = state
        .resolver
        .resolve(image_id)
        .await
        .map_err(|e| state.fail(e))?;

    debug!(image_id, collection = %item.collection, "image_meta_route: resolved");
    Ok(Json(item))
}
