//! Dedup store trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::KubeMindResult;

/// A shared key/value store with an atomic "set if absent, with expiry".
///
/// `set_if_absent` must be a single atomic primitive on the backing store
/// (for Redis, `SET key value NX PX ttl`). A separate existence check
/// followed by a write admits duplicates under concurrency.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Store `value` under `key` for `ttl` unless the key already exists.
    ///
    /// Returns `true` iff this call created the entry. An existing entry is
    /// left untouched, including its remaining time-to-live.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> KubeMindResult<bool>;

    /// Backend name, for logs.
    fn backend(&self) -> &'static str;
}

/// Dedup store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupStoreConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: DedupStoreProvider,
    /// Connection URL (Redis).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for DedupStoreConfig {
    fn default() -> Self {
        Self {
            provider: DedupStoreProvider::Redis,
            url: None,
        }
    }
}

/// Dedup store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupStoreProvider {
    #[default]
    Redis,
    /// In-process map, only correct for a single replica.
    Memory,
}
