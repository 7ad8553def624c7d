//! # metabridge-cache
//!
//! The caching and bounded-concurrency retrieval engine shared by every
//! "get resource(s) by id" tool.
//!
//! ## Architecture
//!
//! ```text
//! retrieve_many(resource, ids)
//!       │  validate (1..=max ids, all positive)
//!       ▼
//! ┌──────────────────┐   waves of 3 / 8 / 5, sequential
//! │  BatchRetriever  │──────────────────────────────┐
//! └────────┬─────────┘                              │
//!          │ per id, concurrent within a wave       │
//!          ▼                                        ▼
//! ┌──────────────────┐   fresh?  ┌───────────────┐  results + errors
//! │  CachedFetcher   │──────────►│ ResourceCache │  in request order,
//! └────────┬─────────┘           └───────────────┘  metrics
//!          │ miss / expired
//!          ▼
//!    ResourceLoader (upstream, single attempt)
//! ```
//!
//! Upstream failures are contained per id: an existing cache entry is served
//! instead (stale fallback), otherwise the id is reported as failed. Only when
//! every id fails does the batch return [`RetrievalError::AllFailed`].

pub mod batch;
pub mod cache;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod registry;

pub use batch::{
    BatchPlan, BatchResult, BatchRetriever, ItemFailure, Provenance, RetrievalOutcome,
    RetrievalRequest, RetrievedItem,
};
pub use cache::{CacheEntry, ResourceCache};
pub use engine::RetrievalEngine;
pub use error::{RetrievalError, UpstreamError};
pub use fetcher::{CachedFetcher, FetchOutcome, ResourceLoader, Source};
pub use metrics::{BatchMetrics, PrimarySource};
pub use registry::{CacheRegistry, CacheStats};
