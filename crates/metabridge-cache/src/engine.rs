//! The retrieval contract exposed to the tool layer.

use crate::batch::{BatchResult, BatchRetriever, RetrievalRequest};
use crate::error::{RetrievalError, UpstreamError};
use crate::fetcher::{CachedFetcher, FetchOutcome, ResourceLoader};
use crate::registry::{CacheRegistry, CacheStats};
use metabridge_core::{CacheConfig, ResourceType, RetrievalConfig};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Caches, loader and batch policy bundled together.
pub struct RetrievalEngine<V = Value> {
    registry: Arc<CacheRegistry<V>>,
    loader: Arc<dyn ResourceLoader<V>>,
    retriever: BatchRetriever,
}

impl<V> Clone for RetrievalEngine<V> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            loader: Arc::clone(&self.loader),
            retriever: self.retriever.clone(),
        }
    }
}

impl<V> RetrievalEngine<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(
        loader: Arc<dyn ResourceLoader<V>>,
        cache: &CacheConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            registry: Arc::new(CacheRegistry::new(cache)),
            loader,
            retriever: BatchRetriever::new(retrieval),
        }
    }

    pub fn registry(&self) -> &Arc<CacheRegistry<V>> {
        &self.registry
    }

    pub fn retrieval_config(&self) -> &RetrievalConfig {
        self.retriever.config()
    }

    /// The cached fetcher for one resource type.
    pub fn fetcher(&self, resource: ResourceType) -> CachedFetcher<V> {
        CachedFetcher::new(
            resource,
            self.registry.cache(resource),
            Arc::clone(&self.loader),
        )
    }

    /// Fetch a single id through the cache.
    pub async fn fetch_one(
        &self,
        resource: ResourceType,
        id: u64,
    ) -> Result<FetchOutcome<V>, UpstreamError> {
        self.fetcher(resource).fetch_or_load(id, Instant::now()).await
    }

    /// Validate `ids` and retrieve them in concurrency-bounded waves.
    pub async fn retrieve_many(
        &self,
        resource: ResourceType,
        ids: &[i64],
    ) -> Result<BatchResult<V>, RetrievalError> {
        let request = RetrievalRequest::new(
            resource,
            ids,
            self.retriever.config().max_ids_per_request,
        )?;
        self.retriever
            .retrieve(&self.fetcher(resource), &request)
            .await
    }

    /// Clear one resource type's cache, or every cache when `resource` is `None`.
    pub fn clear(&self, resource: Option<ResourceType>) {
        match resource {
            Some(resource) => self.registry.clear(resource),
            None => self.registry.clear_all(),
        }
    }

    pub fn cache_stats(&self) -> Vec<CacheStats> {
        self.registry.stats()
    }
}
