//! Runtime and collection configuration.

use crate::errors::IndexError;
use crate::space::Collection;

/// Configured names of the two collections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionNames {
    /// Joint text/visual collection (default `text_visual_index`).
    pub text_visual: String,
    /// Image-only collection (default `pure_visual_index`).
    pub pure_visual: String,
}

impl CollectionNames {
    pub fn name(&self, collection: Collection) -> &str {
        match collection {
            Collection::TextVisual => &self.text_visual,
            Collection::PureVisual => &self.pure_visual,
        }
    }
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            text_visual: "text_visual_index".to_string(),
            pure_visual: "pure_visual_index".to_string(),
        }
    }
}

/// Configuration for connecting to the vector index.
#[derive(Clone, Debug)]
pub struct IndexConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Collection names.
    pub collections: CollectionNames,
}

impl IndexConfig {
    /// Build configuration from environment variables.
    ///
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `COLLECTION_TEXT` (default: "text_visual_index")
    /// - `COLLECTION_VISUAL` (default: "pure_visual_index")
    pub fn from_env() -> Result<Self, IndexError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    /// Same as [`IndexConfig::from_env`] with an explicit variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, IndexError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| var(k).filter(|v| !v.trim().is_empty());
        let defaults = CollectionNames::default();

        let cfg = Self {
            qdrant_url: non_empty("QDRANT_URL").unwrap_or_else(|| "http://localhost:6334".into()),
            qdrant_api_key: non_empty("QDRANT_API_KEY"),
            collections: CollectionNames {
                text_visual: non_empty("COLLECTION_TEXT").unwrap_or(defaults.text_visual),
                pure_visual: non_empty("COLLECTION_VISUAL").unwrap_or(defaults.pure_visual),
            },
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(IndexError::Config("qdrant_url is empty".into()));
        }
        if !(self.qdrant_url.starts_with("http://") || self.qdrant_url.starts_with("https://")) {
            return Err(IndexError::Config(
                "qdrant_url must start with http:// or https://".into(),
            ));
        }
        if self.collections.text_visual == self.collections.pure_visual {
            return Err(IndexError::Config(
                "text and visual collections must be distinct".into(),
            ));
        }
        Ok(())
    }
}
