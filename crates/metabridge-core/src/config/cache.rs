//! Cache configuration.

use crate::resource::ResourceType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Time-to-live settings for the per-resource caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default TTL in milliseconds, applied to every resource type.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Per-resource TTL overrides in milliseconds.
    #[serde(default)]
    pub ttl_overrides_ms: HashMap<ResourceType, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            ttl_overrides_ms: HashMap::new(),
        }
    }
}

impl CacheConfig {
    /// TTL for a given resource type.
    pub fn ttl_for(&self, resource: ResourceType) -> Duration {
        let ms = self
            .ttl_overrides_ms
            .get(&resource)
            .copied()
            .unwrap_or(self.ttl_ms);
        Duration::from_millis(ms)
    }
}

fn default_ttl_ms() -> u64 {
    600_000
}
