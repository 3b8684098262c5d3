//! HTTP layer configuration.
//!
//! # Environment variables
//! - `API_ADDRESS`            (default `0.0.0.0:8000`)
//! - `CORS_ALLOW_ANY`         (default `true`)
//! - `MAX_UPLOAD_BYTES`       (default `10485760`)
//! - `EXPOSE_INTERNAL_ERRORS` (default `false`)
//! - `SEARCH_DEFAULT_LIMIT`   (default `10`)
//! - `SEARCH_MAX_LIMIT`       (default `100`)
//! - `SEARCH_BACKFILL_SELF`   (default `false`)
//! - `INDEX_TIMEOUT_SECS`     (default `10`)

use std::time::Duration;

use embed_gateway::EmbedError;
use search_core::{DEFAULT_INDEX_TIMEOUT, DEFAULT_MAX_LIMIT, RouterOptions};
use thiserror::Error;
use vector_index::IndexError;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Startup configuration errors. Fatal: the process does not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{var} is out of range: {detail}")]
    OutOfRange { var: &'static str, detail: String },

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Gateway(#[from] EmbedError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub address: String,
    pub cors_allow_any: bool,
    pub max_upload_bytes: usize,
    /// Send internal error details to clients instead of a generic message.
    pub expose_internal_errors: bool,
    /// `limit` used when a request does not pass one.
    pub default_limit: u64,
    pub router: RouterOptions,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            cors_allow_any: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            expose_internal_errors: false,
            default_limit: DEFAULT_LIMIT,
            router: RouterOptions::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let max_limit =
            parse_u64(get("SEARCH_MAX_LIMIT"), "SEARCH_MAX_LIMIT")?.unwrap_or(DEFAULT_MAX_LIMIT);
        let default_limit = parse_u64(get("SEARCH_DEFAULT_LIMIT"), "SEARCH_DEFAULT_LIMIT")?
            .unwrap_or(DEFAULT_LIMIT);
        let timeout_secs = parse_u64(get("INDEX_TIMEOUT_SECS"), "INDEX_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_INDEX_TIMEOUT.as_secs());
        let max_upload_bytes = parse_u64(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES")?
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let expose_internal_errors =
            parse_bool(get("EXPOSE_INTERNAL_ERRORS"), "EXPOSE_INTERNAL_ERRORS")?.unwrap_or(false);
        let backfill_self_exclusion =
            parse_bool(get("SEARCH_BACKFILL_SELF"), "SEARCH_BACKFILL_SELF")?.unwrap_or(false);

        let cfg = Self {
            address: get("API_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            cors_allow_any: parse_bool(get("CORS_ALLOW_ANY"), "CORS_ALLOW_ANY")?.unwrap_or(true),
            max_upload_bytes,
            expose_internal_errors,
            default_limit,
            router: RouterOptions {
                max_limit,
                backfill_self_exclusion,
                index_timeout: Duration::from_secs(timeout_secs),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.max_limit == 0 {
            return Err(ConfigError::OutOfRange {
                var: "SEARCH_MAX_LIMIT",
                detail: "must be > 0".into(),
            });
        }
        if !(1..=self.router.max_limit).contains(&self.default_limit) {
            return Err(ConfigError::OutOfRange {
                var: "SEARCH_DEFAULT_LIMIT",
                detail: format!("must be between 1 and {}", self.router.max_limit),
            });
        }
        if self.router.index_timeout.is_zero() {
            return Err(ConfigError::OutOfRange {
                var: "INDEX_TIMEOUT_SECS",
                detail: "must be > 0".into(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::OutOfRange {
                var: "MAX_UPLOAD_BYTES",
                detail: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

fn parse_u64(value: Option<String>, var: &'static str) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                var,
                value: v.clone(),
                reason: "expected an unsigned integer",
            })
        })
        .transpose()
}

fn parse_bool(value: Option<String>, var: &'static str) -> Result<Option<bool>, ConfigError> {
    value
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value: v.clone(),
                reason: "expected true or false",
            }),
        })
        .transpose()
}
