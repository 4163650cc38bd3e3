//! Redis dedup store implementation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use kubemind_core::error::{ErrorCode, KubeMindError, KubeMindResult};
use kubemind_core::traits::DedupStore;

use redis::aio::MultiplexedConnection;
use redis::Client;

/// Default Redis connection URL.
pub(crate) const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Dedup store backed by Redis.
///
/// Uses a single `SET key value NX PX ttl` per check, so concurrent replicas
/// agree on which of them saw an incident first.
pub struct RedisDedupStore {
    connection: MultiplexedConnection,
}

impl RedisDedupStore {
    /// Connect to Redis at `url`.
    pub async fn new(url: &str) -> KubeMindResult<Self> {
        let client = Client::open(url).map_err(|e| KubeMindError::DedupStore {
            message: format!("Failed to create Redis client: {}", e),
            code: ErrorCode::DdpConnectionFailed,
            source: None,
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| KubeMindError::DedupStore {
                message: format!("Failed to connect to Redis: {}", e),
                code: ErrorCode::DdpConnectionFailed,
                source: None,
            })?;

        debug!(url, "Redis dedup store connected");
        Ok(Self { connection })
    }
}

/// Millisecond expiry for `PX`, never zero.
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl DedupStore for RedisDedupStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> KubeMindResult<bool> {
        let mut conn = self.connection.clone();

        // Replies OK when the key was set, nil when it already existed.
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| KubeMindError::dedup_store(format!("Redis SET NX failed: {}", e)))?;

        Ok(reply.is_some())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
