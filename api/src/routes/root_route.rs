use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn root_route() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        message: "Multimodal search API is running",
    })
}
