//! Resource kinds served by the BI service.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A retrievable entity kind. Every kind is handled uniformly by the cache
/// and batch engine; only the upstream path differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// A saved question.
    #[serde(alias = "question")]
    Card,
    Dashboard,
    Table,
    Database,
    Collection,
    Field,
}

impl ResourceType {
    /// All resource types, in a stable order.
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Card,
        ResourceType::Dashboard,
        ResourceType::Table,
        ResourceType::Database,
        ResourceType::Collection,
        ResourceType::Field,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Card => "card",
            ResourceType::Dashboard => "dashboard",
            ResourceType::Table => "table",
            ResourceType::Database => "database",
            ResourceType::Collection => "collection",
            ResourceType::Field => "field",
        }
    }

    /// Whether the upstream exposes a plain listing endpoint for this kind.
    pub fn is_listable(&self) -> bool {
        matches!(
            self,
            ResourceType::Card
                | ResourceType::Dashboard
                | ResourceType::Table
                | ResourceType::Database
                | ResourceType::Collection
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" | "question" => Ok(ResourceType::Card),
            "dashboard" => Ok(ResourceType::Dashboard),
            "table" => Ok(ResourceType::Table),
            "database" => Ok(ResourceType::Database),
            "collection" => Ok(ResourceType::Collection),
            "field" => Ok(ResourceType::Field),
            _ => Err(ValidationError::UnsupportedResource(s.to_string())),
        }
    }
}
