//! Batch timing and source metrics.

use crate::fetcher::Source;
use serde::Serialize;
use std::time::Duration;

/// Which source served the majority of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySource {
    Cache,
    Api,
    Mixed,
}

impl PrimarySource {
    /// More hits than calls is `Cache`, more calls than hits is `Api`, a tie is `Mixed`.
    pub fn classify(cache_hits: usize, api_calls: usize) -> Self {
        match cache_hits.cmp(&api_calls) {
            std::cmp::Ordering::Greater => PrimarySource::Cache,
            std::cmp::Ordering::Less => PrimarySource::Api,
            std::cmp::Ordering::Equal => PrimarySource::Mixed,
        }
    }
}

/// Metrics reported alongside every batch result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMetrics {
    /// Ids served from a fresh cache entry.
    pub cache_hits: usize,
    /// Ids that reached the upstream, whether the call succeeded or not.
    pub api_calls: usize,
    /// Upstream failures answered from an expired cache entry.
    pub stale_fallbacks: usize,
    /// Number of sequential waves.
    pub waves: usize,
    pub total_time_ms: u64,
    pub average_time_per_item_ms: f64,
    pub primary_source: PrimarySource,
}

/// Running counters for a batch in progress.
#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    cache_hits: usize,
    api_calls: usize,
    stale_fallbacks: usize,
}

impl MetricsRecorder {
    pub(crate) fn record_success(&mut self, source: Source) {
        match source {
            Source::Cache => self.cache_hits += 1,
            Source::Api => self.api_calls += 1,
            Source::Stale => {
                self.api_calls += 1;
                self.stale_fallbacks += 1;
            }
        }
    }

    pub(crate) fn record_failure(&mut self) {
        self.api_calls += 1;
    }

    pub(crate) fn finish(self, items: usize, waves: usize, elapsed: Duration) -> BatchMetrics {
        let total_time_ms = duration_ms(elapsed);
        let average_time_per_item_ms = if items == 0 {
            0.0
        } else {
            elapsed.as_micros() as f64 / 1_000.0 / items as f64
        };

        BatchMetrics {
            cache_hits: self.cache_hits,
            api_calls: self.api_calls,
            stale_fallbacks: self.stale_fallbacks,
            waves,
            total_time_ms,
            average_time_per_item_ms,
            primary_source: PrimarySource::classify(self.cache_hits, self.api_calls),
        }
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
