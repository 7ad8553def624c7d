//! # metabridge-client
//!
//! Thin REST client for the upstream BI service. Every call is a single
//! attempt; non-success statuses, transport failures and undecodable bodies
//! are mapped onto [`UpstreamError`] so the cache layer can decide whether to
//! fall back to a stale entry.
//!
//! | Resource   | Endpoint                              |
//! |------------|---------------------------------------|
//! | card       | `GET /api/card/{id}`                  |
//! | dashboard  | `GET /api/dashboard/{id}`             |
//! | table      | `GET /api/table/{id}/query_metadata`  |
//! | database   | `GET /api/database/{id}`              |
//! | collection | `GET /api/collection/{id}`            |
//! | field      | `GET /api/field/{id}`                 |

mod client;
mod service;

pub use client::{ClientError, MetabaseClient};
pub use service::BiService;
pub use metabridge_cache::UpstreamError;
