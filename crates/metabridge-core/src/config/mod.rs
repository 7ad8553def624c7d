//! Configuration types for Metabridge.
//!
//! Configuration is loaded from a single YAML file (`metabridge.yaml` by
//! default). Every section is optional and falls back to its defaults.
//!
//! ```yaml
//! mcp:
//!   transport: http
//!   port: 3000
//! upstream:
//!   base_url: https://bi.example.com
//!   api_key_env: METABASE_API_KEY
//! cache:
//!   ttl_ms: 600000
//!   ttl_overrides_ms:
//!     field: 3600000
//! retrieval:
//!   max_ids_per_request: 50
//! ```

pub mod cache;
pub mod mcp;
pub mod retrieval;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use cache::CacheConfig;
pub use mcp::{McpConfig, Transport};
pub use retrieval::RetrievalConfig;
pub use upstream::UpstreamConfig;

/// Complete Metabridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetabridgeConfig {
    /// MCP server settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Upstream BI service connection.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Cache TTLs.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Batch retrieval tiers and limits.
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MetabridgeConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_ms == 0 {
            return Err(ConfigError::Config("cache.ttl_ms must be greater than 0".into()));
        }
        if let Some((resource, _)) = self.cache.ttl_overrides_ms.iter().find(|(_, ms)| **ms == 0) {
            return Err(ConfigError::Config(format!(
                "cache.ttl_overrides_ms.{} must be greater than 0",
                resource
            )));
        }

        let r = &self.retrieval;
        if r.max_ids_per_request == 0 {
            return Err(ConfigError::Config(
                "retrieval.max_ids_per_request must be greater than 0".into(),
            ));
        }
        if r.medium_chunk_size == 0 || r.large_chunk_size == 0 {
            return Err(ConfigError::Config(
                "retrieval chunk sizes must be greater than 0".into(),
            ));
        }
        if r.small_batch_max > r.medium_batch_max {
            return Err(ConfigError::Config(format!(
                "retrieval.small_batch_max ({}) exceeds retrieval.medium_batch_max ({})",
                r.small_batch_max, r.medium_batch_max
            )));
        }

        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Config("upstream.base_url must not be empty".into()));
        }
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Config("upstream.timeout_ms must be greater than 0".into()));
        }

        Ok(())
    }
}
