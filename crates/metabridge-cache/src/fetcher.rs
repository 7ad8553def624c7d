//! Get-or-fetch with stale fallback for a single id.
//!
//! ```text
//! fetch_or_load(id, now)
//!   ├─ fresh entry ─────────────► Hit(value)            no upstream call
//!   └─ missing / expired ─► load(id)
//!         ├─ Ok(value) ─► put ─► Fresh(value)
//!         └─ Err(e)
//!               ├─ entry exists ► StaleFallback(value)
//!               └─ no entry ────► Err(e)
//! ```
//!
//! The cache check and the cache write are synchronous; the only suspension
//! point is the upstream call. Two concurrent calls for the same id are not
//! coordinated and may both reach the upstream.

use crate::cache::ResourceCache;
use crate::error::UpstreamError;
use async_trait::async_trait;
use metabridge_core::ResourceType;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// The upstream fetch capability, one call per id. Implementations make a
/// single attempt; retries are the caller's concern.
#[async_trait]
pub trait ResourceLoader<V = Value>: Send + Sync {
    async fn load(&self, resource: ResourceType, id: u64) -> Result<V, UpstreamError>;
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A fresh cache entry.
    Cache,
    /// A successful upstream call.
    Api,
    /// A cached entry served after the upstream call failed.
    Stale,
}

/// Result of [`CachedFetcher::fetch_or_load`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<V> {
    Hit(V),
    Fresh(V),
    StaleFallback(V),
}

impl<V> FetchOutcome<V> {
    pub fn source(&self) -> Source {
        match self {
            FetchOutcome::Hit(_) => Source::Cache,
            FetchOutcome::Fresh(_) => Source::Api,
            FetchOutcome::StaleFallback(_) => Source::Stale,
        }
    }

    pub fn value(&self) -> &V {
        match self {
            FetchOutcome::Hit(v) | FetchOutcome::Fresh(v) | FetchOutcome::StaleFallback(v) => v,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            FetchOutcome::Hit(v) | FetchOutcome::Fresh(v) | FetchOutcome::StaleFallback(v) => v,
        }
    }

    /// Whether the upstream was contacted to produce this outcome.
    pub fn called_upstream(&self) -> bool {
        !matches!(self, FetchOutcome::Hit(_))
    }
}

/// One resource type's cache paired with its loader.
pub struct CachedFetcher<V = Value> {
    resource: ResourceType,
    cache: Arc<ResourceCache<V>>,
    loader: Arc<dyn ResourceLoader<V>>,
}

impl<V> Clone for CachedFetcher<V> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource,
            cache: Arc::clone(&self.cache),
            loader: Arc::clone(&self.loader),
        }
    }
}

impl<V> CachedFetcher<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        resource: ResourceType,
        cache: Arc<ResourceCache<V>>,
        loader: Arc<dyn ResourceLoader<V>>,
    ) -> Self {
        Self {
            resource,
            cache,
            loader,
        }
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn cache(&self) -> &Arc<ResourceCache<V>> {
        &self.cache
    }

    /// Serve `id` from cache when fresh, otherwise load it once, falling back
    /// to any existing entry if the load fails.
    pub async fn fetch_or_load(
        &self,
        id: u64,
        now: Instant,
    ) -> Result<FetchOutcome<V>, UpstreamError> {
        let existing = self.cache.get(id);

        if let Some(entry) = &existing {
            if self.cache.is_fresh(entry, now) {
                tracing::debug!(resource = %self.resource, id, "Cache hit");
                return Ok(FetchOutcome::Hit(entry.value.clone()));
            }
        }

        match self.loader.load(self.resource, id).await {
            Ok(value) => {
                self.cache.put(id, value.clone(), now);
                tracing::debug!(resource = %self.resource, id, "Fetched from upstream");
                Ok(FetchOutcome::Fresh(value))
            }
            Err(e) => match existing {
                Some(entry) => {
                    tracing::warn!(
                        resource = %self.resource,
                        id,
                        error = %e,
                        "Upstream fetch failed, serving cached entry"
                    );
                    Ok(FetchOutcome::StaleFallback(entry.value))
                }
                None => Err(e),
            },
        }
    }
}
