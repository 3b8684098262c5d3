//! Embedding Gateway: the single entry point that turns query inputs into
//! space-tagged vectors.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Text goes to the joint encoder and yields [`Embedding<TextVisual>`].
//! - Images are validated, normalised to PNG, encoded by the visual encoder
//!   and reduced by the process-wide [`ImagePooling`] rule, yielding
//!   [`Embedding<PureVisual>`].
//! - A semaphore bounds the number of encoder calls in flight and every
//!   call is bounded by a timeout.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use embed_gateway::{EmbeddingGateway, GatewayConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), embed_gateway::EmbedError> {
//!     let gw = Arc::new(EmbeddingGateway::from_config(GatewayConfig::from_env()?)?);
//!     let v = gw.embed_text("red car").await?;
//!     println!("dim = {}", v.dim());
//!     Ok(())
//! }
//! ```

use std::{sync::Arc, time::Duration};

use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};
use vector_index::{Embedding, PureVisual, TextVisual};

use crate::{
    config::{default_config::GatewayConfig, image_pooling::ImagePooling},
    encoder::{EncodeFuture, ImageEncoder, TextEncoder},
    error_handler::{EmbedError, Result},
    health_service::ProbeTarget,
    image_input::{ensure_image_mime, normalize_to_png},
    services::{image_encoder_service::HttpImageEncoder, text_encoder_service::HttpTextEncoder},
};

/// Shape and limits the gateway enforces around its encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayOptions {
    pub text_dim: usize,
    pub image_dim: usize,
    pub pooling: ImagePooling,
    pub max_concurrency: usize,
    pub timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        use crate::config::default_config::*;
        Self {
            text_dim: DEFAULT_TEXT_DIM,
            image_dim: DEFAULT_IMAGE_DIM,
            pooling: ImagePooling::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl From<&GatewayConfig> for GatewayOptions {
    fn from(cfg: &GatewayConfig) -> Self {
        Self {
            text_dim: cfg.text.dim,
            image_dim: cfg.image.dim,
            pooling: cfg.pooling,
            max_concurrency: cfg.max_concurrency,
            timeout: Duration::from_secs(cfg.text.timeout_secs.max(cfg.image.timeout_secs)),
        }
    }
}

/// Shared gateway over the text and image encoders.
pub struct EmbeddingGateway {
    text: Arc<dyn TextEncoder>,
    image: Arc<dyn ImageEncoder>,
    opts: GatewayOptions,
    permits: Semaphore,
    targets: Vec<ProbeTarget>,
}

impl EmbeddingGateway {
    /// Builds the HTTP encoder clients described by `cfg`.
    ///
    /// # Errors
    /// Returns [`EmbedError`] if either encoder config is invalid or an HTTP
    /// client cannot be built.
    pub fn from_config(cfg: GatewayConfig) -> Result<Self> {
        let opts = GatewayOptions::from(&cfg);
        let targets = vec![
            ProbeTarget::new("text", &cfg.text),
            ProbeTarget::new("image", &cfg.image),
        ];
        let text = Arc::new(HttpTextEncoder::new(cfg.text)?);
        let image = Arc::new(HttpImageEncoder::new(cfg.image)?);

        let mut gw = Self::with_encoders(text, image, opts);
        gw.targets = targets;
        Ok(gw)
    }

    /// Wraps arbitrary encoder implementations.
    pub fn with_encoders(
        text: Arc<dyn TextEncoder>,
        image: Arc<dyn ImageEncoder>,
        opts: GatewayOptions,
    ) -> Self {
        Self {
            text,
            image,
            permits: Semaphore::new(opts.max_concurrency.max(1)),
            opts,
            targets: Vec::new(),
        }
    }

    /// Remote endpoints to probe from `/health` (empty for injected encoders).
    pub fn probe_targets(&self) -> &[ProbeTarget] {
        &self.targets
    }

    /// Embeds a text query into the joint text/visual space.
    ///
    /// # Errors
    /// - [`EmbedError::Encoding`] for empty text (the encoder is not called)
    ///   or an output of the wrong dimensionality
    /// - [`EmbedError::Timeout`] if the encoder call exceeds the timeout
    /// - transport/status/decode errors from the encoder
    #[instrument(skip_all, fields(chars = text.chars().count()))]
    pub async fn embed_text(&self, text: &str) -> Result<Embedding<TextVisual>> {
        if text.trim().is_empty() {
            return Err(EmbedError::Encoding("query text is empty".into()));
        }

        let values = self.bounded(self.text.encode_text(text)).await?;
        check_dim("text", &values, self.opts.text_dim)?;
        debug!(dim = values.len(), "text embedded");
        Ok(Embedding::new(values))
    }

    /// Embeds raw image bytes into the pure visual space.
    ///
    /// # Errors
    /// - [`EmbedError::InvalidInput`] if `mime` is not an image type
    ///   (checked before decoding)
    /// - [`EmbedError::Encoding`] for undecodable bytes, a malformed hidden
    ///   state or a wrong dimensionality
    /// - [`EmbedError::Timeout`] if the encoder call exceeds the timeout
    #[instrument(skip_all, fields(bytes = bytes.len(), %mime))]
    pub async fn embed_image(&self, bytes: &[u8], mime: &str) -> Result<Embedding<PureVisual>> {
        ensure_image_mime(mime)?;

        let owned = bytes.to_vec();
        let png = tokio::task::spawn_blocking(move || normalize_to_png(&owned))
            .await
            .map_err(|e| EmbedError::Encoding(format!("image decoding task failed: {e}")))??;

        let hidden = self.bounded(self.image.encode_image(&png)).await?;
        let values = self.opts.pooling.apply(hidden)?;
        check_dim("image", &values, self.opts.image_dim)?;
        debug!(dim = values.len(), pooling = ?self.opts.pooling, "image embedded");
        Ok(Embedding::new(values))
    }

    /// Runs one encoder call under a concurrency permit and the timeout.
    /// Time spent waiting for a permit counts against the timeout.
    async fn bounded<T>(&self, call: EncodeFuture<'_, T>) -> Result<T> {
        let run = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| EmbedError::Encoding("encoder pool is closed".into()))?;
            call.await
        };

        match tokio::time::timeout(self.opts.timeout, run).await {
            Ok(res) => res,
            Err(_) => {
                warn!(timeout = ?self.opts.timeout, "encoder call timed out");
                Err(EmbedError::Timeout(self.opts.timeout))
            }
        }
    }
}

fn check_dim(which: &str, values: &[f32], expected: usize) -> Result<()> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(EmbedError::Encoding(format!(
            "{which} encoder returned dim {}, expected {expected}",
            values.len()
        )))
    }
}
