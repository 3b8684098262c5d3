use crate::error_handler::{ConfigError, Result, validate_http_endpoint, validate_positive};

/// Connection settings for one remote encoder.
///
/// # Fields
///
/// - `endpoint`: base URL of the encoder server (e.g. `http://localhost:8081`).
/// - `model`: model identifier forwarded to the server
///   (e.g. `"google/siglip-base-patch16-256"`).
/// - `dim`: expected embedding dimensionality; outputs of any other length
///   are rejected.
/// - `timeout_secs`: per-call timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Encoder server base URL.
    pub endpoint: String,

    /// Model identifier string.
    pub model: String,

    /// Expected output dimensionality.
    pub dim: usize,

    /// Request timeout (in seconds).
    pub timeout_secs: u64,
}

impl EncoderConfig {
    /// Checks endpoint scheme, model name, dimension and timeout.
    ///
    /// `var` names the endpoint variable in error messages.
    pub fn validate(&self, var: &'static str) -> Result<()> {
        validate_http_endpoint(var, &self.endpoint)?;
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_positive("dim", self.dim as u64)?;
        validate_positive("timeout_secs", self.timeout_secs)?;
        Ok(())
    }

    /// Endpoint without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }
}
