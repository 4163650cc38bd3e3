//! Factory for creating dedup stores.

use std::sync::Arc;
use tracing::{info, warn};

use kubemind_core::error::KubeMindResult;
use kubemind_core::traits::{DedupStore, DedupStoreConfig, DedupStoreProvider};

use crate::memory::InMemoryDedupStore;

/// Factory for creating dedup stores.
pub struct DedupStoreFactory;

impl DedupStoreFactory {
    /// Create a dedup store from the given configuration.
    pub async fn create(config: DedupStoreConfig) -> KubeMindResult<Arc<dyn DedupStore>> {
        let store: Arc<dyn DedupStore> = match config.provider {
            #[cfg(feature = "redis")]
            DedupStoreProvider::Redis => {
                let url = config
                    .url
                    .as_deref()
                    .unwrap_or(crate::redis_store::DEFAULT_REDIS_URL);
                Arc::new(crate::redis_store::RedisDedupStore::new(url).await?)
            }

            DedupStoreProvider::Memory => {
                warn!("In-memory dedup store is not shared between replicas");
                Arc::new(InMemoryDedupStore::new())
            }

            #[allow(unreachable_patterns)]
            _ => {
                return Err(kubemind_core::KubeMindError::UnsupportedProvider {
                    provider: format!("{:?}", config.provider),
                })
            }
        };

        info!(backend = store.backend(), "Dedup store created");
        Ok(store)
    }

    /// Connect to a Redis dedup store.
    #[cfg(feature = "redis")]
    pub async fn redis(url: &str) -> KubeMindResult<Arc<dyn DedupStore>> {
        Self::create(DedupStoreConfig {
            provider: DedupStoreProvider::Redis,
            url: Some(url.to_string()),
        })
        .await
    }

    /// Create an in-process dedup store.
    pub fn memory() -> Arc<dyn DedupStore> {
        Arc::new(InMemoryDedupStore::new())
    }
}
