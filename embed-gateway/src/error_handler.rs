//! Unified error handling for `embed-gateway`.
//!
//! This module exposes a single top-level error type [`EmbedError`] for the
//! whole library and groups configuration errors in [`ConfigError`]. Small
//! helpers for reading/validating environment variables are provided and
//! return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[Embed Gateway]` to simplify attribution in logs.

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, EmbedError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `embed-gateway` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Input rejected before any encoder call (e.g. non-image mime type).
    #[error("[Embed Gateway] invalid input: {0}")]
    InvalidInput(String),

    /// Input could not be encoded (empty text, undecodable image, bad output shape).
    #[error("[Embed Gateway] encoding failed: {0}")]
    Encoding(String),

    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[Embed Gateway] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Encoder returned a non-successful HTTP status.
    #[error("[Embed Gateway] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Encoder response could not be decoded.
    #[error("[Embed Gateway] decode error: {0}")]
    Decode(String),

    /// Operation exceeded the configured timeout.
    #[error("[Embed Gateway] operation timed out after {0:?}")]
    Timeout(Duration),
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A number failed to parse (like dimensions, limits, timeouts).
    #[error("[Embed Gateway] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `TEXT_EMBEDDING_DIM`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[Embed Gateway] invalid format in {var}: {reason}")]
    InvalidFormat {
        /// Variable name (e.g., `TEXT_ENCODER_URL`).
        var: &'static str,
        /// Explanation (e.g., `must start with http:// or https://`).
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[Embed Gateway] {field} is out of range: {detail}")]
    OutOfRange {
        /// Field name (e.g., `dim`).
        field: &'static str,
        /// Description of the expected range.
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[Embed Gateway] model name must not be empty")]
    EmptyModel,

    /// Unknown value for `IMAGE_POOLING`.
    #[error("[Embed Gateway] unsupported image pooling: {0}")]
    UnsupportedPooling(String),
}

/* ------------------------------------------------------------------------- */
/* Env helpers                                                               */
/* ------------------------------------------------------------------------- */

/// Reads a variable through `var`, treating empty values as unset.
pub fn env_opt<F>(var: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    var(name).filter(|v| !v.trim().is_empty())
}

/// Parses an optional `u64` (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if the variable is set but not a valid `u64`.
pub fn env_opt_u64<F>(var: &F, name: &'static str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match env_opt(var, name) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            EmbedError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`ConfigError::InvalidFormat`] when the string does not start
/// with a valid HTTP scheme.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Ensures a count-like value is strictly positive.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] for zero.
pub fn validate_positive(field: &'static str, value: u64) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected a value > 0",
        }
        .into())
    }
}

/// Trims a response body into a short log-friendly snippet.
pub fn make_snippet(body: &str) -> String {
    body.trim().chars().take(240).collect()
}
