//! kubemind-vector-stores - Vector store implementations for kubemind.
//!
//! # Supported Backends
//!
//! - **Qdrant** (feature: `qdrant`) - High-performance vector database
//! - **Memory** - In-process brute-force store for local runs and tests
//!
//! # Example
//!
//! ```ignore
//! use kubemind_vector_stores::VectorStoreFactory;
//!
//! let store = VectorStoreFactory::qdrant_with_url("k8s_incidents", "http://localhost:6334", 768).await?;
//! ```

mod factory;
mod memory;

#[cfg(feature = "qdrant")]
mod qdrant;

// Public exports
pub use factory::VectorStoreFactory;
pub use memory::{cosine_similarity, InMemoryVectorStore};

#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;

// Re-export core types for convenience
pub use kubemind_core::traits::{
    DistanceMetric, VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig,
    VectorStoreProvider,
};
