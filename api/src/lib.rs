//! HTTP surface of the multimodal search service.

use std::sync::Arc;

pub mod core {
    pub mod app_state;
    pub mod config;
}
pub mod error_handler;
mod routes {
    pub mod health {
        pub mod health_response;
        pub mod health_route;
    }
    pub mod image {
        pub mod image_meta_route;
    }
    pub mod root_route;
    pub mod search {
        pub mod search_params;
        pub mod search_text_route;
        pub mod search_upload_route;
        pub mod search_visual_route;
    }
}

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{
        health::health_route::health_route,
        image::image_meta_route::image_meta_route,
        root_route::root_route,
        search::{
            search_text_route::search_text_route, search_upload_route::search_upload_route,
            search_visual_route::search_visual_route,
        },
    },
};

/// Builds the application router over a ready state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_allow_any {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/", get(root_route))
        .route("/health", get(health_route))
        .route("/search/text", get(search_text_route))
        .route("/search/visual/upload", post(search_upload_route))
        .route("/search/visual/{image_id}", get(search_visual_route))
        .route("/image/{image_id}", get(image_meta_route))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Loads the state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env().await?);
    let address = state.config.address.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!("API listening on {address}");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("API stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use embed_gateway::{
        EmbeddingGateway, EncodeFuture, GatewayOptions, ImageEncoder, TextEncoder,
    };
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use vector_index::{
        BoxFuture, CollectionNames, IndexError, IndexRegistry, MemoryIndex, RawPoint,
        RetrieveOptions, SearchHit, SearchParams, VectorIndex,
    };

    use crate::core::config::ApiConfig;

    struct FakeText;

    impl TextEncoder for FakeText {
        fn encode_text<'a>(&'a self, _text: &'a str) -> EncodeFuture<'a, Vec<f32>> {
            Box::pin(async { Ok(vec![1.0, 0.0]) })
        }
    }

    #[derive(Default)]
    struct FakeImage {
        calls: AtomicUsize,
    }

    impl ImageEncoder for FakeImage {
        fn encode_image<'a>(&'a self, _png: &'a [u8]) -> EncodeFuture<'a, Vec<Vec<f32>>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![vec![0.0, 1.0, 0.0]])
            })
        }
    }

    /// Answers the startup probe, fails everything else.
    struct Broken;

    impl VectorIndex for Broken {
        fn search<'a>(
            &'a self,
            _: &'a str,
            _: &'a [f32],
            _: u64,
            _: SearchParams,
        ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
            Box::pin(async { Err(IndexError::Backend("grpc: connection reset".into())) })
        }

        fn retrieve<'a>(
            &'a self,
            _: &'a str,
            _: &'a [u64],
            _: RetrieveOptions,
        ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
            Box::pin(async { Err(IndexError::Backend("grpc: connection reset".into())) })
        }

        fn count<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
            Box::pin(async { Ok(1) })
        }
    }

    /// Answers the two startup counts, then stops responding.
    #[derive(Default)]
    struct Hanging {
        counts: AtomicUsize,
    }

    impl VectorIndex for Hanging {
        fn search<'a>(
            &'a self,
            _: &'a str,
            _: &'a [f32],
            _: u64,
            _: SearchParams,
        ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
            Box::pin(std::future::pending())
        }

        fn retrieve<'a>(
            &'a self,
            _: &'a str,
            _: &'a [u64],
            _: RetrieveOptions,
        ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
            Box::pin(std::future::pending())
        }

        fn count<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
            let seen = self.counts.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if seen >= 2 {
                    std::future::pending::<()>().await;
                }
                Ok(1)
            })
        }
    }

    fn index() -> MemoryIndex {
        let n = CollectionNames::default();
        let (tv, pv) = (n.text_visual.as_str(), n.pure_visual.as_str());
        MemoryIndex::new()
            .with_point(
                tv,
                1,
                vec![1.0, 0.0],
                json!({"url": "http://img/1.jpg", "description": "red car"}),
            )
            .with_point(tv, 2, vec![0.0, 1.0], json!({"url": "http://img/2.jpg"}))
            .with_point(
                tv,
                42,
                vec![0.6, 0.8],
                json!({"url": "http://img/42.jpg", "source": "joint"}),
            )
            .with_point(
                pv,
                42,
                vec![1.0, 0.0, 0.0],
                json!({"url": "http://img/42.jpg", "source": "visual"}),
            )
            .with_point(pv, 7, vec![0.9, 0.1, 0.0], json!({"url": "http://img/7.jpg"}))
            .with_point(pv, 19, vec![0.8, 0.3, 0.0], json!({"url": "http://img/19.jpg"}))
            .with_point(pv, 5, vec![0.0, 1.0, 0.0], json!({"url": "http://img/5.jpg"}))
    }

    struct TestApp {
        app: Router,
        image: Arc<FakeImage>,
    }

    async fn app_with(backend: Option<Arc<dyn VectorIndex>>, config: ApiConfig) -> TestApp {
        let registry = match backend {
            Some(b) => IndexRegistry::bootstrap(b, CollectionNames::default()).await,
            None => IndexRegistry::degraded(CollectionNames::default()),
        };
        let image = Arc::new(FakeImage::default());
        let gateway = EmbeddingGateway::with_encoders(
            Arc::new(FakeText),
            image.clone(),
            GatewayOptions {
                text_dim: 2,
                image_dim: 3,
                ..GatewayOptions::default()
            },
        );
        let state = AppState::new(config, Arc::new(registry), Some(Arc::new(gateway)));
        TestApp {
            app: build_router(Arc::new(state)),
            image,
        }
    }

    async fn app() -> TestApp {
        app_with(Some(Arc::new(index())), ApiConfig::default()).await
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        call(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    fn png() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn upload(uri: &str, field: &str, mime: &str, data: &[u8]) -> Request<Body> {
        const BOUNDARY: &str = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"q.png\"\r\n\
                 Content-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn ids(body: &Value) -> Vec<u64> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn root_reports_ok() {
        let t = app().await;
        let (status, body) = get(&t.app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn text_search_returns_hits() {
        let t = app().await;
        let (status, body) = get(&t.app, "/search/text?q=red%20car&limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "red car");
        assert_eq!(ids(&body), vec![1, 42]);
        assert_eq!(body["results"][0]["payload"]["description"], "red car");
        assert!(body["results"][0]["score"].is_number());
    }

    #[tokio::test]
    async fn text_search_uses_default_limit() {
        let t = app().await;
        let (status, body) = get(&t.app, "/search/text?q=car").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(&body).len(), 3);
    }

    #[tokio::test]
    async fn text_search_rejects_empty_or_missing_query() {
        let t = app().await;
        for uri in ["/search/text?q=", "/search/text"] {
            let (status, body) = get(&t.app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn malformed_params_are_bad_requests() {
        let t = app().await;
        for uri in [
            "/search/text?q=car&limit=ten",
            "/search/text?q=car&limit=0",
            "/search/text?q=car&limit=101",
            "/search/visual/abc",
            "/image/-1",
        ] {
            let (status, body) = get(&t.app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], "BAD_REQUEST", "{uri}");
        }
    }

    #[tokio::test]
    async fn visual_search_excludes_self() {
        let t = app().await;
        let (status, body) = get(&t.app, "/search/visual/42?limit=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_id"], 42);
        assert_eq!(ids(&body), vec![7, 19]);
    }

    #[tokio::test]
    async fn visual_search_backfills_when_configured() {
        let mut config = ApiConfig::default();
        config.router.backfill_self_exclusion = true;
        let t = app_with(Some(Arc::new(index())), config).await;

        let (_, body) = get(&t.app, "/search/visual/42?limit=3").await;
        assert_eq!(ids(&body), vec![7, 19, 5]);
    }

    #[tokio::test]
    async fn visual_search_unknown_id_is_404() {
        let t = app().await;
        let (status, body) = get(&t.app, "/search/visual/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn upload_search_returns_hits() {
        let t = app().await;
        let (status, body) = call(
            &t.app,
            upload("/search/visual/upload?limit=2", "file", "image/png", &png()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "uploaded_image");
        assert_eq!(ids(&body)[0], 5);
        assert_eq!(t.image.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_image_upload_is_400_without_encoding() {
        let t = app().await;
        let (status, body) = call(
            &t.app,
            upload("/search/visual/upload", "file", "text/plain", b"hello"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
        assert_eq!(t.image.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let t = app().await;
        let (status, _) = call(
            &t.app,
            upload("/search/visual/upload", "picture", "image/png", &png()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let config = ApiConfig {
            max_upload_bytes: 64,
            ..ApiConfig::default()
        };
        let t = app_with(Some(Arc::new(index())), config).await;
        let (status, _) = call(
            &t.app,
            upload("/search/visual/upload", "file", "image/png", &[0u8; 4096]),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(t.image.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn image_metadata_prefers_joint_collection() {
        let t = app().await;

        let (status, body) = get(&t.app, "/image/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["collection"], "text_visual");
        assert_eq!(body["payload"]["source"], "joint");

        let (_, body) = get(&t.app, "/image/7").await;
        assert_eq!(body["collection"], "pure_visual");
        assert_eq!(body["payload"]["url"], "http://img/7.jpg");

        let (status, _) = get(&t.app, "/image/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn degraded_index_is_503() {
        let t = app_with(None, ApiConfig::default()).await;
        for uri in ["/search/text?q=car", "/search/visual/42", "/image/42"] {
            let (status, body) = get(&t.app, uri).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
            assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
        }
        let (status, _) = call(
            &t.app,
            upload("/search/visual/upload", "file", "image/png", &png()),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(t.image.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn internal_errors_are_redacted() {
        let t = app_with(Some(Arc::new(Broken)), ApiConfig::default()).await;
        let (status, body) = get(&t.app, "/image/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INTERNAL_ERROR");
        assert_eq!(body["message"], "internal server error");

        let exposed = ApiConfig {
            expose_internal_errors: true,
            ..ApiConfig::default()
        };
        let t = app_with(Some(Arc::new(Broken)), exposed).await;
        let (_, body) = get(&t.app, "/image/1").await;
        assert!(body["message"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn health_reports_index_and_encoders() {
        let t = app().await;
        let (status, body) = get(&t.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["index"]["available"], true);
        assert_eq!(body["index"]["collections"][0]["item_count"], 3);
        assert_eq!(body["index"]["collections"][1]["item_count"], 4);
        assert_eq!(body["encoders"]["loaded"], true);

        let t = app_with(None, ApiConfig::default()).await;
        let (status, body) = get(&t.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["index"]["available"], false);
    }

    #[tokio::test]
    async fn health_does_not_wait_on_a_stuck_index() {
        let mut config = ApiConfig::default();
        config.router.index_timeout = Duration::from_millis(50);
        let t = app_with(Some(Arc::new(Hanging::default())), config).await;

        let (status, body) = tokio::time::timeout(Duration::from_secs(2), get(&t.app, "/health"))
            .await
            .expect("health must answer within the index budget");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["index"]["available"], true);
        assert_eq!(body["index"]["collections"], json!([]));
    }
}
