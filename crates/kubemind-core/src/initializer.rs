//! Startup creation of the memory collection.

use std::sync::Arc;
use tracing::{error, info};

use crate::traits::{DistanceMetric, VectorStore};

/// Ensures the memory collection exists before anything reads or writes it.
pub struct CollectionInitializer {
    store: Arc<dyn VectorStore>,
    collection: String,
    dimension: usize,
}

impl CollectionInitializer {
    pub fn new(store: Arc<dyn VectorStore>, collection: impl Into<String>, dimension: usize) -> Self {
        Self {
            store,
            collection: collection.into(),
            dimension,
        }
    }

    /// Create the collection if it is missing.
    ///
    /// Idempotent. Returns `true` when the collection is known to exist
    /// afterwards. A failure is logged and reported as `false`; startup
    /// continues and later operations on the collection fail individually.
    pub async fn initialize(&self) -> bool {
        match self
            .store
            .ensure_collection(&self.collection, self.dimension, DistanceMetric::Cosine)
            .await
        {
            Ok(true) => {
                info!(
                    collection = %self.collection,
                    dimension = self.dimension,
                    "Created memory collection"
                );
                true
            }
            Ok(false) => {
                info!(collection = %self.collection, "Memory collection already exists");
                true
            }
            Err(e) => {
                error!(
                    collection = %self.collection,
                    error = %e,
                    "Failed to initialize memory collection"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockVectorStore;

    #[tokio::test]
    async fn test_creates_missing_collection_once() {
        let store = Arc::new(MockVectorStore::default());
        let initializer = CollectionInitializer::new(store.clone(), "k8s_incidents", 768);

        assert!(initializer.initialize().await);
        assert!(store.has_collection("k8s_incidents"));
        assert!(initializer.initialize().await);
    }

    #[tokio::test]
    async fn test_failure_does_not_propagate() {
        let store = Arc::new(MockVectorStore::failing());
        let initializer = CollectionInitializer::new(store, "k8s_incidents", 768);

        assert!(!initializer.initialize().await);
    }
}
