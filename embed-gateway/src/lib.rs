//! Embedding gateway for query-time encoding.
//!
//! Turns a text query or an uploaded image into a vector tagged with the
//! space it belongs to, so it can only be searched against the matching
//! collection. See [`EmbeddingGateway`].

pub mod config {
    pub mod default_config;
    pub mod encoder_config;
    pub mod image_pooling;
}
pub mod encoder;
pub mod error_handler;
pub mod gateway;
pub mod health_service;
pub mod image_input;
pub mod services {
    pub mod image_encoder_service;
    pub mod text_encoder_service;
}
pub mod telemetry;

pub use config::{
    default_config::GatewayConfig, encoder_config::EncoderConfig, image_pooling::ImagePooling,
};
pub use encoder::{EncodeFuture, ImageEncoder, TextEncoder};
pub use error_handler::{ConfigError, EmbedError};
pub use gateway::{EmbeddingGateway, GatewayOptions};
pub use health_service::{HealthService, HealthStatus, ProbeTarget};
