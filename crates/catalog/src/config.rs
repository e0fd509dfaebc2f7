use crate::db::DEFAULT_MAX_CONNECTIONS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where the catalog lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; created (with its schema) on first connect.
    pub path: PathBuf,
    pub max_connections: u32,
    /// How long a writer waits for the lock before the store counts as busy.
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("shelf.sqlite3"),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_ms: 1500,
        }
    }
}

/// Listing options for catalog browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Books per page when browsing a genre.
    pub page_size: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// Per-user daily ceiling for metered operations (questions to the LLM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub daily_limit: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { daily_limit: 10 }
    }
}
