//! Per-resource cache instances.
//!
//! The registry owns exactly one [`ResourceCache`] per [`ResourceType`],
//! created at construction. It is passed explicitly to whatever needs a cache
//! rather than living in process-wide state.

use crate::cache::ResourceCache;
use crate::metrics::duration_ms;
use metabridge_core::{CacheConfig, ResourceType};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Size and TTL of one resource cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub resource: ResourceType,
    pub entries: usize,
    pub ttl_ms: u64,
}

/// One cache per resource type.
#[derive(Debug)]
pub struct CacheRegistry<V = Value> {
    caches: HashMap<ResourceType, Arc<ResourceCache<V>>>,
}

impl<V: Clone> CacheRegistry<V> {
    /// Build a cache for every resource type using the configured TTLs.
    pub fn new(config: &CacheConfig) -> Self {
        let caches = ResourceType::ALL
            .into_iter()
            .map(|resource| (resource, Arc::new(ResourceCache::new(config.ttl_for(resource)))))
            .collect();
        Self { caches }
    }

    /// The cache for a resource type.
    pub fn cache(&self, resource: ResourceType) -> Arc<ResourceCache<V>> {
        // Every variant is inserted in `new`.
        Arc::clone(&self.caches[&resource])
    }

    /// Drop all entries for one resource type.
    pub fn clear(&self, resource: ResourceType) {
        self.caches[&resource].clear();
        tracing::info!(resource = %resource, "Cleared resource cache");
    }

    /// Drop all entries for every resource type.
    pub fn clear_all(&self) {
        for cache in self.caches.values() {
            cache.clear();
        }
        tracing::info!("Cleared all resource caches");
    }

    /// Entry counts per resource type, in [`ResourceType::ALL`] order.
    pub fn stats(&self) -> Vec<CacheStats> {
        ResourceType::ALL
            .into_iter()
            .map(|resource| {
                let cache = &self.caches[&resource];
                CacheStats {
                    resource,
                    entries: cache.len(),
                    ttl_ms: duration_ms(cache.ttl()),
                }
            })
            .collect()
    }
}
