//! Encoder abstractions.
//!
//! Async is required because the real encoders run in separate model
//! servers; implement these traits to plug in another backend.

use std::{future::Future, pin::Pin};

use crate::error_handler::EmbedError;

/// Boxed future returned by encoder calls.
pub type EncodeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EmbedError>> + Send + 'a>>;

/// Encoder for the joint text/visual space.
pub trait TextEncoder: Send + Sync {
    /// Pooled text features for a single query string.
    fn encode_text<'a>(&'a self, text: &'a str) -> EncodeFuture<'a, Vec<f32>>;
}

/// Encoder for the pure visual space.
pub trait ImageEncoder: Send + Sync {
    /// Last hidden state (`tokens × dim`) for one normalised PNG image.
    fn encode_image<'a>(&'a self, png: &'a [u8]) -> EncodeFuture<'a, Vec<Vec<f32>>>;
}
