//! In-process dedup store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use kubemind_core::error::{KubeMindError, KubeMindResult};
use kubemind_core::traits::DedupStore;

/// Dedup store holding keys in a process-local map.
///
/// Expiry follows tokio's clock. Entries are only shared within one process,
/// so replicas behind a load balancer each keep their own window.
#[derive(Default)]
pub struct InMemoryDedupStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unexpired keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .map(|entries| entries.values().filter(|(_, exp)| *exp > now).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> KubeMindResult<bool> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| KubeMindError::internal("dedup store lock poisoned"))?;

        // Sweep expired keys so the map stays bounded by the window.
        entries.retain(|_, (_, expires_at)| *expires_at > now);

        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
