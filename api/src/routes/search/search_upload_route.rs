use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::QueryRejection,
    },
};
use search_core::UploadSearchResult;
use tracing::debug;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::search::search_params::LimitParams,
};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// `POST /search/visual/upload?limit=` with a multipart `file` field.
///
/// The part's declared content type is the mime hint; a part without one
/// is treated as `application/octet-stream` and rejected as a non-image.
pub async fn search_upload_route(
    State(state): State<Arc<AppState>>,
    params: Result<Query<LimitParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadSearchResult>> {
    let Query(p) = params?;
    let mut multipart = multipart?;
    let limit = state.limit(p.limit);

    let (mime, bytes) = loop {
        let Some(field) = multipart.next_field().await? else {
            return Err(AppError::BadRequest(format!(
                "multipart field '{FILE_FIELD}' is required"
            )));
        };
        if field.name() == Some(FILE_FIELD) {
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            break (mime, field.bytes().await?);
        }
    };
    debug!(%mime, bytes = bytes.len(), limit, "search_upload_route: start");

    let out = state
        .router
        .search_by_upload(&bytes, &mime, limit)
        .await
        .map_err(|e| state.fail(e))?;

    debug!(hits = out.results.len(), "search_upload_route: success");
    Ok(Json(out))
}
