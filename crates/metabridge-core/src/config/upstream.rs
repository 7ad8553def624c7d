//! Upstream BI service configuration.
//!
//! The API key can be given inline or, preferably, through an environment
//! variable named by `api_key_env`. The environment variable wins when both
//! are present.

use serde::{Deserialize, Serialize};
use std::env;

/// Connection settings for the upstream BI service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the service, e.g. `https://bi.example.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent as the `x-api-key` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl UpstreamConfig {
    /// Resolve the API key, checking `api_key_env` before the inline value.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_env
            .as_ref()
            .and_then(|name| env::var(name).ok())
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}
