//! Bounded-concurrency batch retrieval.
//!
//! Ids are split into waves whose size depends only on the request size (see
//! [`RetrievalConfig::chunk_size_for`]). Waves run one after another; within a
//! wave every id is fetched concurrently and the wave ends when all of them
//! have resolved. A failed id never cancels its siblings.
//!
//! Results and errors are assembled by request position, not completion
//! order. Repeated ids are fetched once per occurrence.

use crate::error::RetrievalError;
use crate::fetcher::{CachedFetcher, Source};
use crate::metrics::{duration_ms, BatchMetrics, MetricsRecorder};
use futures::future::join_all;
use metabridge_core::{ResourceType, RetrievalConfig, ValidationError};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

/// A validated request for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    resource: ResourceType,
    ids: Vec<u64>,
}

impl RetrievalRequest {
    /// Validate raw ids: non-empty, at most `max_ids`, all positive.
    pub fn new(
        resource: ResourceType,
        ids: &[i64],
        max_ids: usize,
    ) -> Result<Self, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::EmptyIds);
        }
        if ids.len() > max_ids {
            return Err(ValidationError::TooManyIds {
                count: ids.len(),
                max: max_ids,
            });
        }
        let ids = ids
            .iter()
            .map(|&id| {
                u64::try_from(id)
                    .ok()
                    .filter(|&id| id > 0)
                    .ok_or(ValidationError::NonPositiveId { id })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { resource, ids })
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn ids(&self) -> &[u64] {
        &self.ids
    }
}

/// Ids partitioned into ordered waves, each id tagged with its request position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    chunk_size: usize,
    chunks: Vec<Vec<(usize, u64)>>,
}

impl BatchPlan {
    pub fn new(ids: &[u64], config: &RetrievalConfig) -> Self {
        let chunk_size = config.chunk_size_for(ids.len());
        let indexed: Vec<(usize, u64)> = ids.iter().copied().enumerate().collect();
        let chunks = indexed.chunks(chunk_size).map(<[_]>::to_vec).collect();
        Self { chunk_size, chunks }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks(&self) -> &[Vec<(usize, u64)>] {
        &self.chunks
    }

    /// Size of each wave, in execution order.
    pub fn wave_sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }
}

/// How a successful value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub source: Source,
    /// Wall time spent on this id; zero for cache hits.
    pub elapsed_ms: u64,
}

/// A successfully retrieved id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedItem<V = Value> {
    pub id: u64,
    pub value: V,
    pub provenance: Provenance,
}

/// An id that could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub id: u64,
    pub message: String,
}

/// Per-id result, in request order.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome<V = Value> {
    Success(RetrievedItem<V>),
    Failure(ItemFailure),
}

/// Outcome of a batch where at least one id succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult<V = Value> {
    pub resource: ResourceType,
    pub results: Vec<RetrievedItem<V>>,
    pub errors: Vec<ItemFailure>,
    pub metrics: BatchMetrics,
}

impl<V> BatchResult<V> {
    pub fn requested(&self) -> usize {
        self.results.len() + self.errors.len()
    }

    pub fn successful(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// True when some, but not all, ids failed.
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Drives a [`CachedFetcher`] over many ids in concurrency-bounded waves.
#[derive(Debug, Clone, Default)]
pub struct BatchRetriever {
    config: RetrievalConfig,
}

impl BatchRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn plan(&self, ids: &[u64]) -> BatchPlan {
        BatchPlan::new(ids, &self.config)
    }

    /// Fetch every id of `request` through `fetcher`.
    ///
    /// Returns [`RetrievalError::AllFailed`] when no id succeeded; otherwise a
    /// result carrying both successes and per-id failures.
    pub async fn retrieve<V>(
        &self,
        fetcher: &CachedFetcher<V>,
        request: &RetrievalRequest,
    ) -> Result<BatchResult<V>, RetrievalError>
    where
        V: Clone + Send + Sync + 'static,
    {
        let resource = request.resource();
        let plan = self.plan(request.ids());
        let started = Instant::now();
        let mut recorder = MetricsRecorder::default();
        let mut slots: Vec<Option<RetrievalOutcome<V>>> =
            std::iter::repeat_with(|| None).take(request.ids().len()).collect();

        tracing::debug!(
            resource = %resource,
            ids = request.ids().len(),
            chunk_size = plan.chunk_size(),
            waves = plan.chunks().len(),
            "Starting batch retrieval"
        );

        for chunk in plan.chunks() {
            let wave = chunk.iter().map(|&(index, id)| async move {
                let item_started = Instant::now();
                let result = fetcher.fetch_or_load(id, item_started).await;
                (index, id, result, item_started.elapsed())
            });

            for (index, id, result, elapsed) in join_all(wave).await {
                let outcome = match result {
                    Ok(fetched) => {
                        let source = fetched.source();
                        recorder.record_success(source);
                        let elapsed = if source == Source::Cache {
                            Duration::ZERO
                        } else {
                            elapsed
                        };
                        RetrievalOutcome::Success(RetrievedItem {
                            id,
                            value: fetched.into_value(),
                            provenance: Provenance {
                                source,
                                elapsed_ms: duration_ms(elapsed),
                            },
                        })
                    }
                    Err(e) => {
                        recorder.record_failure();
                        RetrievalOutcome::Failure(ItemFailure {
                            id,
                            message: e.to_string(),
                        })
                    }
                };
                slots[index] = Some(outcome);
            }
        }

        let mut results = Vec::new();
        let mut errors = Vec::new();
        for outcome in slots.into_iter().flatten() {
            match outcome {
                RetrievalOutcome::Success(item) => results.push(item),
                RetrievalOutcome::Failure(failure) => errors.push(failure),
            }
        }

        let metrics = recorder.finish(request.ids().len(), plan.chunks().len(), started.elapsed());

        if results.is_empty() {
            tracing::warn!(
                resource = %resource,
                failed = errors.len(),
                "Every id in the batch failed"
            );
            return Err(RetrievalError::AllFailed { resource, errors });
        }

        tracing::info!(
            resource = %resource,
            successful = results.len(),
            failed = errors.len(),
            cache_hits = metrics.cache_hits,
            api_calls = metrics.api_calls,
            total_time_ms = metrics.total_time_ms,
            "Batch retrieval complete"
        );

        Ok(BatchResult {
            resource,
            results,
            errors,
            metrics,
        })
    }
}
