//! # metabridge-core
//!
//! Types shared by every Metabridge crate: the resource kinds the BI service
//! exposes, the validation error raised before any upstream call is made, and
//! the YAML configuration model.

pub mod config;
pub mod error;
pub mod resource;

pub use config::{
    CacheConfig, ConfigError, McpConfig, MetabridgeConfig, RetrievalConfig, Transport,
    UpstreamConfig,
};
pub use error::ValidationError;
pub use resource::ResourceType;
