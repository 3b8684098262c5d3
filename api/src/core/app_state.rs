use std::sync::Arc;

use embed_gateway::{EmbeddingGateway, GatewayConfig, HealthService};
use search_core::{MetadataResolver, QueryRouter, SearchError};
use tracing::{info, warn};
use vector_index::{IndexConfig, IndexRegistry};

use crate::{
    core::config::{ApiConfig, ConfigError},
    error_handler::AppError,
};

const HEALTH_PROBE_TIMEOUT_SECS: u64 = 5;

/// Shared state for all HTTP handlers.
///
/// Built once before the listener is bound and read-only afterwards.
pub struct AppState {
    pub config: ApiConfig,
    pub registry: Arc<IndexRegistry>,
    /// `None` when the encoder clients could not be created.
    pub gateway: Option<Arc<EmbeddingGateway>>,
    pub router: QueryRouter,
    pub resolver: MetadataResolver,
    /// Encoder probes for `/health`.
    pub health: Option<HealthService>,
}

impl AppState {
    /// Loads every config from the environment, opens the index and builds
    /// the encoder clients.
    ///
    /// Invalid configuration is fatal. An unreachable index or encoder
    /// clients that cannot be built only degrade the service.
    pub async fn from_env() -> Result<Self, ConfigError> {
        let config = ApiConfig::from_env()?;
        let index_cfg = IndexConfig::from_env()?;
        let gateway_cfg = GatewayConfig::from_env()?;

        let registry = Arc::new(IndexRegistry::open(&index_cfg).await);

        info!(
            text_model = %gateway_cfg.text.model,
            image_model = %gateway_cfg.image.model,
            pooling = ?gateway_cfg.pooling,
            "Loading encoders"
        );
        let gateway = match EmbeddingGateway::from_config(gateway_cfg) {
            Ok(gw) => Some(Arc::new(gw)),
            Err(err) => {
                warn!("Could not initialise encoders: {err}; encoder-backed searches are disabled");
                None
            }
        };

        let health = HealthService::new(HEALTH_PROBE_TIMEOUT_SECS)
            .inspect_err(|err| warn!("Health probes disabled: {err}"))
            .ok();

        let mut state = Self::new(config, registry, gateway);
        state.health = health;
        Ok(state)
    }

    /// Wires router and resolver over already-built resources.
    pub fn new(
        config: ApiConfig,
        registry: Arc<IndexRegistry>,
        gateway: Option<Arc<EmbeddingGateway>>,
    ) -> Self {
        let router = QueryRouter::new(gateway.clone(), registry.clone(), config.router);
        let resolver = MetadataResolver::new(registry.clone(), config.router.index_timeout);
        Self {
            config,
            registry,
            gateway,
            router,
            resolver,
            health: None,
        }
    }

    /// Requested limit, or the configured default.
    pub fn limit(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.config.default_limit)
    }

    /// Maps a search failure to its HTTP error, honouring the redaction setting.
    pub fn fail(&self, err: SearchError) -> AppError {
        AppError::from_search(err, self.config.expose_internal_errors)
    }
}
