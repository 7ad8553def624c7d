//! The upstream operations the tool layer depends on.

use crate::client::MetabaseClient;
use async_trait::async_trait;
use metabridge_cache::{ResourceLoader, UpstreamError};
use metabridge_core::ResourceType;
use serde_json::Value;

/// Upstream BI operations beyond single-resource loads. Every method is a
/// single attempt.
#[async_trait]
pub trait BiService: ResourceLoader + Send + Sync {
    /// List all resources of a listable type.
    async fn list(&self, resource: ResourceType) -> Result<Value, UpstreamError>;

    /// Full-text search.
    async fn search(&self, query: &str, models: &[String]) -> Result<Value, UpstreamError>;

    /// Run a saved question.
    async fn execute_card(&self, card_id: u64) -> Result<Value, UpstreamError>;

    /// Run a native query.
    async fn execute_query(&self, database_id: u64, query: &str) -> Result<Value, UpstreamError>;
}

#[async_trait]
impl BiService for MetabaseClient {
    async fn list(&self, resource: ResourceType) -> Result<Value, UpstreamError> {
        MetabaseClient::list(self, resource).await
    }

    async fn search(&self, query: &str, models: &[String]) -> Result<Value, UpstreamError> {
        MetabaseClient::search(self, query, models).await
    }

    async fn execute_card(&self, card_id: u64) -> Result<Value, UpstreamError> {
        MetabaseClient::execute_card(self, card_id).await
    }

    async fn execute_query(&self, database_id: u64, query: &str) -> Result<Value, UpstreamError> {
        MetabaseClient::execute_query(self, database_id, query).await
    }
}
