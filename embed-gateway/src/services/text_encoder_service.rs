//! HTTP client for the text encoder server.
//!
//! - `POST {endpoint}/embed/text` with `{ "model", "input" }`
//! - Response: `{ "embedding": number[] }` (pooled text features)

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::encoder_config::EncoderConfig;
use crate::encoder::{EncodeFuture, TextEncoder};
use crate::error_handler::{EmbedError, Result, make_snippet};

/// Thin client for the text encoder.
///
/// Reuses one HTTP client with the configured timeout.
pub struct HttpTextEncoder {
    client: reqwest::Client,
    cfg: EncoderConfig,
    url_embed: String,
}

impl HttpTextEncoder {
    /// Creates a new client from the given config.
    ///
    /// # Errors
    /// - [`EmbedError::Config`] if the config is invalid
    /// - [`EmbedError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: EncoderConfig) -> Result<Self> {
        cfg.validate("TEXT_ENCODER_URL")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .brotli(true)
            .build()?;

        let url_embed = format!("{}/embed/text", cfg.base_url());
        Ok(Self {
            client,
            cfg,
            url_embed,
        })
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    async fn embed(&self, input: &str) -> Result<Vec<f32>> {
        let body = TextEmbedRequest {
            model: &self.cfg.model,
            input,
        };

        debug!("POST {}", self.url_embed);
        let resp = self.client.post(&self.url_embed).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(EmbedError::HttpStatus {
                status,
                url: self.url_embed.clone(),
                snippet: make_snippet(&text),
            });
        }

        let out: TextEmbedResponse = resp.json().await.map_err(|e| {
            EmbedError::Decode(format!("serde error: {e}; expected `{{ embedding: number[] }}`"))
        })?;

        Ok(out.embedding)
    }
}

impl TextEncoder for HttpTextEncoder {
    fn encode_text<'a>(&'a self, text: &'a str) -> EncodeFuture<'a, Vec<f32>> {
        Box::pin(self.embed(text))
    }
}

/// Request body for `/embed/text`.
#[derive(Debug, Serialize)]
struct TextEmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response body for `/embed/text`.
#[derive(Debug, Deserialize)]
struct TextEmbedResponse {
    #[serde(alias = "text_embeds")]
    embedding: Vec<f32>,
}
