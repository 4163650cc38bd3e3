//! In-process vector store with brute-force similarity search.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use kubemind_core::error::{ErrorCode, KubeMindError, KubeMindResult};
use kubemind_core::traits::{DistanceMetric, VectorRecord, VectorSearchResult, VectorStore};

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for vectors of different length, empty vectors or zero
/// vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > f32::EPSILON && norm_b > f32::EPSILON {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

fn euclidean_similarity(a: &[f32], b: &[f32]) -> f32 {
    let distance: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt();
    1.0 / (1.0 + distance)
}

struct Collection {
    dimension: usize,
    distance: DistanceMetric,
    records: HashMap<String, VectorRecord>,
}

impl Collection {
    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.distance {
            DistanceMetric::Cosine => cosine_similarity(a, b),
            DistanceMetric::Euclidean => euclidean_similarity(a, b),
            DistanceMetric::DotProduct => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
        }
    }
}

/// Vector store that keeps every collection in process memory.
///
/// Like a real backend, operations on the bound collection fail until it has
/// been created.
pub struct InMemoryVectorStore {
    collection_name: String,
    dimension: usize,
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a store bound to `collection_name`. No collection exists yet.
    pub fn new(collection_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            collection_name: collection_name.into(),
            dimension,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Dimension the bound collection is expected to have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of records in the bound collection.
    pub fn len(&self) -> usize {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(&self.collection_name).map(|c| c.records.len()))
            .unwrap_or(0)
    }

    /// Whether the bound collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn missing_collection(&self) -> KubeMindError {
        KubeMindError::VectorStore {
            message: format!("Collection '{}' does not exist", self.collection_name),
            code: ErrorCode::VecCollectionNotFound,
            source: None,
        }
    }
}

fn poisoned<T>(_: T) -> KubeMindError {
    KubeMindError::internal("vector store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> KubeMindResult<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        if collections.contains_key(name) {
            return Err(KubeMindError::vector_store(format!(
                "Collection '{}' already exists",
                name
            )));
        }

        collections.insert(
            name.to_string(),
            Collection {
                dimension,
                distance,
                records: HashMap::new(),
            },
        );
        debug!(collection = name, dimension, ?distance, "Collection created");
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> KubeMindResult<bool> {
        Ok(self.collections.read().map_err(poisoned)?.contains_key(name))
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> KubeMindResult<()> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let collection = collections
            .get_mut(&self.collection_name)
            .ok_or_else(|| self.missing_collection())?;

        if let Some(bad) = records.iter().find(|r| r.vector.len() != collection.dimension) {
            return Err(KubeMindError::dimension_mismatch(
                collection.dimension,
                bad.vector.len(),
            ));
        }

        for record in records {
            collection.records.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_score: Option<f32>,
    ) -> KubeMindResult<Vec<VectorSearchResult>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let collection = collections
            .get(&self.collection_name)
            .ok_or_else(|| self.missing_collection())?;

        if query_vector.len() != collection.dimension {
            return Err(KubeMindError::dimension_mismatch(
                collection.dimension,
                query_vector.len(),
            ));
        }

        let mut results: Vec<VectorSearchResult> = collection
            .records
            .values()
            .map(|record| VectorSearchResult {
                id: record.id.clone(),
                score: collection.score(query_vector, &record.vector),
                payload: record.payload.clone(),
            })
            .filter(|r| min_score.map_or(true, |min| r.score >= min))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(limit);
        Ok(results)
    }

    async fn get(&self, id: &str) -> KubeMindResult<Option<VectorRecord>> {
        let collections = self.collections.read().map_err(poisoned)?;
        let collection = collections
            .get(&self.collection_name)
            .ok_or_else(|| self.missing_collection())?;
        Ok(collection.records.get(id).cloned())
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
