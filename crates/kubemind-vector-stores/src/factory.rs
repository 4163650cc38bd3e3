//! Factory for creating vector store providers.

use std::sync::Arc;
use tracing::info;

use kubemind_core::error::KubeMindResult;
use kubemind_core::traits::{VectorStore, VectorStoreConfig, VectorStoreProvider};
#[cfg(feature = "qdrant")]
use serde_json::json;

use crate::memory::InMemoryVectorStore;

/// Factory for creating vector store providers.
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Create a vector store from the given configuration.
    pub async fn create(config: VectorStoreConfig) -> KubeMindResult<Arc<dyn VectorStore>> {
        let store: Arc<dyn VectorStore> = match config.provider {
            #[cfg(feature = "qdrant")]
            VectorStoreProvider::Qdrant => {
                Arc::new(crate::qdrant::QdrantVectorStore::new(config.clone()).await?)
            }

            VectorStoreProvider::Memory => Arc::new(InMemoryVectorStore::new(
                config.collection_name.clone(),
                config.embedding_model_dims,
            )),

            #[allow(unreachable_patterns)]
            _ => {
                return Err(kubemind_core::KubeMindError::UnsupportedProvider {
                    provider: format!("{:?}", config.provider),
                })
            }
        };

        info!(
            provider = ?config.provider,
            collection = store.collection_name(),
            dims = config.embedding_model_dims,
            "Vector store created"
        );
        Ok(store)
    }

    /// Create a Qdrant vector store with default configuration.
    #[cfg(feature = "qdrant")]
    pub async fn qdrant(
        collection_name: &str,
        dims: usize,
    ) -> KubeMindResult<Arc<dyn VectorStore>> {
        Self::create(VectorStoreConfig {
            provider: VectorStoreProvider::Qdrant,
            collection_name: collection_name.to_string(),
            embedding_model_dims: dims,
            config: json!({}),
        })
        .await
    }

    /// Create a Qdrant vector store with custom URL.
    #[cfg(feature = "qdrant")]
    pub async fn qdrant_with_url(
        collection_name: &str,
        url: &str,
        dims: usize,
    ) -> KubeMindResult<Arc<dyn VectorStore>> {
        Self::create(VectorStoreConfig {
            provider: VectorStoreProvider::Qdrant,
            collection_name: collection_name.to_string(),
            embedding_model_dims: dims,
            config: json!({
                "url": url
            }),
        })
        .await
    }

    /// Create an in-process vector store.
    ///
    /// Contents are lost on restart; intended for development and tests.
    pub fn memory(collection_name: &str, dims: usize) -> Arc<dyn VectorStore> {
        Arc::new(InMemoryVectorStore::new(collection_name, dims))
    }
}
