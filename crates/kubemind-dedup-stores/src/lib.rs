//! kubemind-dedup-stores - Incident dedup store implementations for kubemind.
//!
//! # Supported Backends
//!
//! - **Redis** (feature: `redis`) - Shared across replicas via `SET NX PX`
//! - **Memory** - In-process map, correct only for a single replica
//!
//! # Example
//!
//! ```ignore
//! use kubemind_dedup_stores::DedupStoreFactory;
//!
//! let store = DedupStoreFactory::redis("redis://localhost:6379").await?;
//! ```

mod factory;
mod memory;

#[cfg(feature = "redis")]
mod redis_store;

pub use factory::DedupStoreFactory;
pub use memory::InMemoryDedupStore;

#[cfg(feature = "redis")]
pub use redis_store::RedisDedupStore;

// Re-export core types for convenience
pub use kubemind_core::traits::{DedupStore, DedupStoreConfig, DedupStoreProvider};
