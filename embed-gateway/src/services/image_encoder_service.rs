//! HTTP client for the visual encoder server.
//!
//! - `POST {endpoint}/embed/image?model=<model>` with a PNG body
//! - Response: `{ "last_hidden_state": number[][] }` (`tokens × dim`)
//!
//! The server returns the raw hidden state so that the token extraction
//! rule stays on this side and is applied identically to every image.

use std::time::Duration;

use reqwest::header;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::encoder_config::EncoderConfig;
use crate::encoder::{EncodeFuture, ImageEncoder};
use crate::error_handler::{EmbedError, Result, make_snippet};

/// Thin client for the visual encoder.
pub struct HttpImageEncoder {
    client: reqwest::Client,
    cfg: EncoderConfig,
    url_embed: String,
}

impl HttpImageEncoder {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`EmbedError::Config`] if the config is invalid
    /// - [`EmbedError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: EncoderConfig) -> Result<Self> {
        cfg.validate("IMAGE_ENCODER_URL")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .brotli(true)
            .build()?;

        let url_embed = format!("{}/embed/image", cfg.base_url());
        Ok(Self {
            client,
            cfg,
            url_embed,
        })
    }

    #[instrument(skip_all, fields(model = %self.cfg.model, bytes = png.len()))]
    async fn embed(&self, png: &[u8]) -> Result<Vec<Vec<f32>>> {
        debug!("POST {}", self.url_embed);
        let resp = self
            .client
            .post(&self.url_embed)
            .query(&[("model", self.cfg.model.as_str())])
            .header(header::CONTENT_TYPE, "image/png")
            .body(png.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::HttpStatus {
                status,
                url: self.url_embed.clone(),
                snippet: make_snippet(&text),
            });
        }

        let out: ImageEmbedResponse = resp.json().await.map_err(|e| {
            EmbedError::Decode(format!(
                "serde error: {e}; expected `{{ last_hidden_state: number[][] }}`"
            ))
        })?;

        Ok(out.last_hidden_state)
    }
}

impl ImageEncoder for HttpImageEncoder {
    fn encode_image<'a>(&'a self, png: &'a [u8]) -> EncodeFuture<'a, Vec<Vec<f32>>> {
        Box::pin(self.embed(png))
    }
}

/// Response body for `/embed/image`.
#[derive(Debug, Deserialize)]
struct ImageEmbedResponse {
    last_hidden_state: Vec<Vec<f32>>,
}
