//! Encoder configs loaded from environment variables.
//!
//! Two encoders back the gateway:
//!
//! - **Text**  → joint text/visual model (SigLIP), pooled text features
//! - **Image** → pure visual model (DINOv2), last hidden state
//!
//! # Environment variables
//!
//! Text encoder:
//! - `TEXT_ENCODER_URL`   (default `http://localhost:8081`)
//! - `TEXT_ENCODER_MODEL` (default `google/siglip-base-patch16-256`)
//! - `TEXT_EMBEDDING_DIM` (default `768`)
//!
//! Image encoder:
//! - `IMAGE_ENCODER_URL`   (default `http://localhost:8082`)
//! - `IMAGE_ENCODER_MODEL` (default `facebook/dinov2-large`)
//! - `IMAGE_EMBEDDING_DIM` (default `1024`)
//! - `IMAGE_POOLING`       (`cls` | `mean`, default `cls`)
//!
//! Shared:
//! - `ENCODER_TIMEOUT_SECS`    (default `30`)
//! - `ENCODER_MAX_CONCURRENCY` (default `4`)

use crate::{
    config::{encoder_config::EncoderConfig, image_pooling::ImagePooling},
    error_handler::{Result, env_opt, env_opt_u64, validate_positive},
};

pub const DEFAULT_TEXT_MODEL: &str = "google/siglip-base-patch16-256";
pub const DEFAULT_IMAGE_MODEL: &str = "facebook/dinov2-large";
pub const DEFAULT_TEXT_DIM: usize = 768;
pub const DEFAULT_IMAGE_DIM: usize = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Complete gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub text: EncoderConfig,
    pub image: EncoderConfig,
    /// Extraction rule for the visual encoder output.
    pub pooling: ImagePooling,
    /// Maximum number of encoder calls in flight across all requests.
    pub max_concurrency: usize,
}

impl GatewayConfig {
    /// Reads the whole gateway configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`GatewayConfig::from_env`] with an explicit variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs =
            env_opt_u64(&var, "ENCODER_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let max_concurrency = env_opt_u64(&var, "ENCODER_MAX_CONCURRENCY")?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);
        validate_positive("max_concurrency", max_concurrency as u64)?;

        let pooling = match env_opt(&var, "IMAGE_POOLING") {
            Some(v) => v.parse::<ImagePooling>()?,
            None => ImagePooling::default(),
        };

        Ok(Self {
            text: config_text_encoder(&var, timeout_secs)?,
            image: config_image_encoder(&var, timeout_secs)?,
            pooling,
            max_concurrency,
        })
    }
}

/// Constructs the config for the **text** encoder (joint text/visual space).
pub fn config_text_encoder<F>(var: &F, timeout_secs: u64) -> Result<EncoderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let cfg = EncoderConfig {
        endpoint: env_opt(var, "TEXT_ENCODER_URL")
            .unwrap_or_else(|| "http://localhost:8081".into()),
        model: env_opt(var, "TEXT_ENCODER_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.into()),
        dim: env_opt_u64(var, "TEXT_EMBEDDING_DIM")?
            .map(|d| d as usize)
            .unwrap_or(DEFAULT_TEXT_DIM),
        timeout_secs,
    };
    cfg.validate("TEXT_ENCODER_URL")?;
    Ok(cfg)
}

/// Constructs the config for the **image** encoder (pure visual space).
pub fn config_image_encoder<F>(var: &F, timeout_secs: u64) -> Result<EncoderConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let cfg = EncoderConfig {
        endpoint: env_opt(var, "IMAGE_ENCODER_URL")
            .unwrap_or_else(|| "http://localhost:8082".into()),
        model: env_opt(var, "IMAGE_ENCODER_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.into()),
        dim: env_opt_u64(var, "IMAGE_EMBEDDING_DIM")?
            .map(|d| d as usize)
            .unwrap_or(DEFAULT_IMAGE_DIM),
        timeout_secs,
    };
    cfg.validate("IMAGE_ENCODER_URL")?;
    Ok(cfg)
}
