//! Validation errors.

use thiserror::Error;

/// A malformed retrieval request. Raised before any fetch is attempted and
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The id list was empty.
    #[error("at least one id is required")]
    EmptyIds,

    /// More ids were requested than a single call allows.
    #[error("too many ids: {count} requested, maximum is {max}")]
    TooManyIds { count: usize, max: usize },

    /// An id was zero or negative.
    #[error("invalid id {id}: ids must be positive integers")]
    NonPositiveId { id: i64 },

    /// The resource type is not one the engine knows how to retrieve.
    #[error("unsupported resource type: {0}")]
    UnsupportedResource(String),
}
