//! reqwest-backed client.

use async_trait::async_trait;
use metabridge_cache::{ResourceLoader, UpstreamError};
use metabridge_core::{ResourceType, UpstreamConfig};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";
const MAX_ERROR_BODY: usize = 500;

/// Errors building the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API key contains characters not allowed in an HTTP header")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// REST client for the upstream BI service.
#[derive(Debug, Clone)]
pub struct MetabaseClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetabaseClient {
    /// Build a client from upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = config.resolve_api_key() {
            let mut value = HeaderValue::from_str(&key)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        } else {
            tracing::warn!("No upstream API key configured; requests will be unauthenticated");
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Path of a single resource.
    pub fn resource_path(resource: ResourceType, id: u64) -> String {
        match resource {
            ResourceType::Table => format!("/api/table/{}/query_metadata", id),
            other => format!("/api/{}/{}", other.as_str(), id),
        }
    }

    /// Fetch one resource by id.
    pub async fn get_resource(
        &self,
        resource: ResourceType,
        id: u64,
    ) -> Result<Value, UpstreamError> {
        let path = Self::resource_path(resource, id);
        self.send(self.request(Method::GET, &path), &path).await
    }

    /// List every resource of a listable type.
    pub async fn list(&self, resource: ResourceType) -> Result<Value, UpstreamError> {
        let path = format!("/api/{}", resource.as_str());
        self.send(self.request(Method::GET, &path), &path).await
    }

    /// Full-text search, optionally restricted to some model kinds.
    pub async fn search(&self, query: &str, models: &[String]) -> Result<Value, UpstreamError> {
        let path = "/api/search";
        let mut params: Vec<(&str, &str)> = vec![("q", query)];
        params.extend(models.iter().map(|m| ("models", m.as_str())));
        self.send(self.request(Method::GET, path).query(&params), path)
            .await
    }

    /// Run a saved question.
    pub async fn execute_card(&self, card_id: u64) -> Result<Value, UpstreamError> {
        let path = format!("/api/card/{}/query", card_id);
        self.send(self.request(Method::POST, &path).json(&json!({})), &path)
            .await
    }

    /// Run a native query against a database.
    pub async fn execute_query(
        &self,
        database_id: u64,
        query: &str,
    ) -> Result<Value, UpstreamError> {
        let path = "/api/dataset";
        let body = json!({
            "database": database_id,
            "type": "native",
            "native": { "query": query }
        });
        self.send(self.request(Method::POST, path).json(&body), path)
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Value, UpstreamError> {
        tracing::debug!(path, "Upstream request");

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(path, status = status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                UpstreamError::Decode(e.to_string())
            } else {
                UpstreamError::Transport(e.to_string())
            }
        })
    }
}

#[async_trait]
impl ResourceLoader for MetabaseClient {
    async fn load(&self, resource: ResourceType, id: u64) -> Result<Value, UpstreamError> {
        self.get_resource(resource, id).await
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}
