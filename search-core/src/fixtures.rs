//! Shared test doubles: counting fake encoders and a small two-collection index.
//!
//! Joint collection (dim 4): ids 1, 2, 3, 42.
//! Pure visual collection (dim 3): ids 42, 7, 19, 5, 8, where the three
//! nearest neighbours of 42 are `[42, 7, 19]`.

use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use embed_gateway::{EmbeddingGateway, EncodeFuture, GatewayOptions, ImageEncoder, TextEncoder};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::json;
use vector_index::{
    BoxFuture, CollectionNames, IndexError, IndexRegistry, MemoryIndex, RawPoint,
    RetrieveOptions, SearchHit, SearchParams, VectorIndex,
};

use crate::router::{QueryRouter, RouterOptions};

#[derive(Default)]
pub struct FakeText {
    pub calls: AtomicUsize,
}

impl TextEncoder for FakeText {
    fn encode_text<'a>(&'a self, _text: &'a str) -> EncodeFuture<'a, Vec<f32>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0, 0.0, 0.0])
        })
    }
}

#[derive(Default)]
pub struct FakeImage {
    pub calls: AtomicUsize,
}

impl ImageEncoder for FakeImage {
    fn encode_image<'a>(&'a self, _png: &'a [u8]) -> EncodeFuture<'a, Vec<Vec<f32>>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // CLS row first, then patch tokens.
            Ok(vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 0.0]])
        })
    }
}

pub struct Fixture {
    pub text: Arc<FakeText>,
    pub image: Arc<FakeImage>,
    pub gateway: Arc<EmbeddingGateway>,
    pub registry: Arc<IndexRegistry>,
}

impl Fixture {
    pub async fn new() -> Self {
        let text = Arc::new(FakeText::default());
        let image = Arc::new(FakeImage::default());
        let gateway = Arc::new(EmbeddingGateway::with_encoders(
            text.clone(),
            image.clone(),
            GatewayOptions {
                text_dim: 4,
                image_dim: 3,
                ..GatewayOptions::default()
            },
        ));
        let registry = Arc::new(
            IndexRegistry::bootstrap(Arc::new(sample_index()), CollectionNames::default()).await,
        );
        Self {
            text,
            image,
            gateway,
            registry,
        }
    }

    pub fn router(&self, opts: RouterOptions) -> QueryRouter {
        QueryRouter::new(Some(self.gateway.clone()), self.registry.clone(), opts)
    }
}

pub fn sample_index() -> MemoryIndex {
    let names = CollectionNames::default();
    let (tv, pv) = (names.text_visual.as_str(), names.pure_visual.as_str());
    MemoryIndex::new()
        .with_point(
            tv,
            1,
            vec![1.0, 0.0, 0.0, 0.0],
            json!({"url": "http://img/1.jpg", "description": "red car"}),
        )
        .with_point(tv, 2, vec![0.7, 0.7, 0.0, 0.0], json!({"url": "http://img/2.jpg"}))
        .with_point(tv, 3, vec![0.0, 0.0, 1.0, 0.0], json!({"url": "http://img/3.jpg"}))
        .with_point(
            tv,
            42,
            vec![0.0, 0.0, 0.0, 1.0],
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
        .with_point(pv, 8, vec![0.0, 0.0, 1.0], json!({"url": "http://img/8.jpg"}))
}

pub fn png() -> Vec<u8> {
    let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Backend that answers the startup probe and then never answers again.
struct Stalled;

impl VectorIndex for Stalled {
    fn search<'a>(
        &'a self,
        _: &'a str,
        _: &'a [f32],
        _: u64,
        _: SearchParams,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(Vec::new())
        })
    }

    fn retrieve<'a>(
        &'a self,
        _: &'a str,
        ids: &'a [u64],
        _: RetrieveOptions,
    ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(vec![None; ids.len()])
        })
    }

    fn count<'a>(&'a self, _: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
        Box::pin(async { Ok(1) })
    }
}

pub async fn stalled_registry() -> Arc<IndexRegistry> {
    Arc::new(IndexRegistry::bootstrap(Arc::new(Stalled), CollectionNames::default()).await)
}

/// One search call as the backend received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchCall {
    pub collection: String,
    pub limit: u64,
    pub params: SearchParams,
}

/// Sample index that remembers every search it serves.
pub struct Recording {
    inner: MemoryIndex,
    searches: Mutex<Vec<SearchCall>>,
}

impl Recording {
    pub fn new(inner: MemoryIndex) -> Self {
        Self {
            inner,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn searches(&self) -> Vec<SearchCall> {
        self.searches.lock().unwrap().clone()
    }
}

impl VectorIndex for Recording {
    fn search<'a>(
        &'a self,
        collection: &'a str,
        vector: &'a [f32],
        limit: u64,
        params: SearchParams,
    ) -> BoxFuture<'a, Result<Vec<SearchHit>, IndexError>> {
        self.searches.lock().unwrap().push(SearchCall {
            collection: collection.to_string(),
            limit,
            params,
        });
        self.inner.search(collection, vector, limit, params)
    }

    fn retrieve<'a>(
        &'a self,
        collection: &'a str,
        ids: &'a [u64],
        opts: RetrieveOptions,
    ) -> BoxFuture<'a, Result<Vec<Option<RawPoint>>, IndexError>> {
        self.inner.retrieve(collection, ids, opts)
    }

    fn count<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, Result<u64, IndexError>> {
        self.inner.count(collection)
    }
}

/// Router over the sample index wrapped in [`Recording`].
pub async fn recording_router(
    fx: &Fixture,
    opts: RouterOptions,
) -> (QueryRouter, Arc<Recording>) {
    let index = Arc::new(Recording::new(sample_index()));
    let registry =
        Arc::new(IndexRegistry::bootstrap(index.clone(), CollectionNames::default()).await);
    (QueryRouter::new(Some(fx.gateway.clone()), registry, opts), index)
}
