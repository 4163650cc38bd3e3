//! Vector store trait and related types.
//!
//! The process owns one long-lived vector store handle, shared behind an
//! `Arc`. Reads (`search`, `get`) may run from any number of tasks. Writes
//! (`upsert`) are issued only by the memory consolidator, which processes
//! one item at a time, so the handle itself needs no locking.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::KubeMindResult;

/// Distance metric for vector similarity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
}

/// A vector record with payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique identifier.
    pub id: String,
    /// Vector embedding.
    pub vector: Vec<f32>,
    /// Metadata payload.
    pub payload: HashMap<String, serde_json::Value>,
}

impl VectorRecord {
    /// Create a new vector record.
    pub fn new(
        id: impl Into<String>,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    /// Get a payload value as a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

/// Search result from vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorSearchResult {
    /// Unique identifier.
    pub id: String,
    /// Similarity score (higher = closer).
    pub score: f32,
    /// Metadata payload.
    pub payload: HashMap<String, serde_json::Value>,
}

impl VectorSearchResult {
    /// Get a payload value as a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

/// Core VectorStore trait - all vector store backends implement this.
///
/// A store instance is bound to one collection (see
/// [`VectorStore::collection_name`]); `upsert`, `search` and `get` operate on
/// that collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a new collection.
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> KubeMindResult<()>;

    /// Check whether a collection exists.
    async fn collection_exists(&self, name: &str) -> KubeMindResult<bool>;

    /// Create the collection if it does not exist yet.
    ///
    /// Returns `true` when this call created it.
    async fn ensure_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> KubeMindResult<bool> {
        if self.collection_exists(name).await? {
            return Ok(false);
        }
        self.create_collection(name, dimension, distance).await?;
        Ok(true)
    }

    /// Insert or replace records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> KubeMindResult<()>;

    /// Search for the `limit` nearest vectors, highest score first.
    ///
    /// When `min_score` is set, results scoring below it are omitted.
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_score: Option<f32>,
    ) -> KubeMindResult<Vec<VectorSearchResult>>;

    /// Get a record by ID.
    async fn get(&self, id: &str) -> KubeMindResult<Option<VectorRecord>>;

    /// Get the collection name.
    fn collection_name(&self) -> &str;
}

/// Vector store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: VectorStoreProvider,
    /// Collection name.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    /// Embedding dimensions.
    #[serde(default = "default_embedding_dims")]
    pub embedding_model_dims: usize,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: serde_json::Value,
}

fn default_collection_name() -> String {
    "k8s_incidents".to_string()
}

fn default_embedding_dims() -> usize {
    768
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Qdrant,
            collection_name: default_collection_name(),
            embedding_model_dims: default_embedding_dims(),
            config: serde_json::json!({}),
        }
    }
}

/// Vector store provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreProvider {
    #[default]
    Qdrant,
    /// In-process store, contents lost on restart.
    Memory,
}
