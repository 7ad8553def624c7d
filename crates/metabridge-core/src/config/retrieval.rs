//! Batch retrieval configuration.
//!
//! Chunk size is a pure function of the number of requested ids:
//!
//! | ids                              | chunk size          |
//! |----------------------------------|---------------------|
//! | `n <= small_batch_max`           | `n` (single wave)   |
//! | `n <= medium_batch_max`          | `medium_chunk_size` |
//! | larger                           | `large_chunk_size`  |

use serde::{Deserialize, Serialize};

/// Concurrency tiers and request limits for batch retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum ids accepted in one request.
    #[serde(default = "default_max_ids")]
    pub max_ids_per_request: usize,

    /// Requests up to this size run in a single wave.
    #[serde(default = "default_small_batch_max")]
    pub small_batch_max: usize,

    /// Requests up to this size use `medium_chunk_size`.
    #[serde(default = "default_medium_batch_max")]
    pub medium_batch_max: usize,

    /// Concurrency for medium requests.
    #[serde(default = "default_medium_chunk_size")]
    pub medium_chunk_size: usize,

    /// Concurrency for large requests.
    #[serde(default = "default_large_chunk_size")]
    pub large_chunk_size: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_ids_per_request: default_max_ids(),
            small_batch_max: default_small_batch_max(),
            medium_batch_max: default_medium_batch_max(),
            medium_chunk_size: default_medium_chunk_size(),
            large_chunk_size: default_large_chunk_size(),
        }
    }
}

impl RetrievalConfig {
    /// Number of ids fetched concurrently in each wave for a request of `count` ids.
    pub fn chunk_size_for(&self, count: usize) -> usize {
        if count <= self.small_batch_max {
            count.max(1)
        } else if count <= self.medium_batch_max {
            self.medium_chunk_size
        } else {
            self.large_chunk_size
        }
    }
}

fn default_max_ids() -> usize {
    50
}

fn default_small_batch_max() -> usize {
    3
}

fn default_medium_batch_max() -> usize {
    20
}

fn default_medium_chunk_size() -> usize {
    8
}

fn default_large_chunk_size() -> usize {
    5
}
