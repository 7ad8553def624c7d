//! Error types for the retrieval engine.

use crate::batch::ItemFailure;
use metabridge_core::{ResourceType, ValidationError};
use thiserror::Error;

/// Failure of a single upstream load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("invalid upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// True for a 404 from the upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Status { status: 404, .. })
    }
}

/// Errors surfaced by `retrieve_many`.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    /// The request was rejected before any fetch.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every requested id failed.
    #[error("failed to retrieve any of {} {resource} resource(s): {}", errors.len(), summarize(errors))]
    AllFailed {
        resource: ResourceType,
        errors: Vec<ItemFailure>,
    },
}

fn summarize(errors: &[ItemFailure]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.id, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
