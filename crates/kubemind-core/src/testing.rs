//! In-memory providers shared by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{KubeMindError, KubeMindResult};
use crate::traits::{DistanceMetric, Embedder, VectorRecord, VectorSearchResult, VectorStore};
use crate::types::{IncidentResolution, MemoryRecord};

/// Embedder returning a unit vector for every text.
pub(crate) struct MockEmbedder {
    dims: usize,
    fail_on: Option<String>,
    fail_all: bool,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub(crate) fn new(dims: usize) -> Self {
        Self {
            dims,
            fail_on: None,
            fail_all: false,
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing(dims: usize) -> Self {
        Self {
            fail_all: true,
            ..Self::new(dims)
        }
    }

    pub(crate) fn failing_on(mut self, text: &str) -> Self {
        self.fail_on = Some(text.to_string());
        self
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub(crate) fn seen_texts(&self) -> Arc<Mutex<Vec<String>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> KubeMindResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        if self.fail_all || self.fail_on.as_deref() == Some(text) {
            return Err(KubeMindError::embedding("embedding service unavailable"));
        }
        let mut vector = vec![0.0; self.dims];
        if let Some(first) = vector.first_mut() {
            *first = 1.0;
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Vector store returning scripted search results and recording writes.
#[derive(Default)]
pub(crate) struct MockVectorStore {
    results: Vec<VectorSearchResult>,
    fail_search: bool,
    fail_collections: bool,
    collections: Mutex<HashSet<String>>,
    upserts: Mutex<Vec<VectorRecord>>,
    searches: Mutex<Vec<(usize, Option<f32>)>>,
}

impl MockVectorStore {
    /// Every search returns `results` as given, ignoring limit and min score.
    pub(crate) fn with_results(results: Vec<VectorSearchResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail_search: true,
            fail_collections: true,
            ..Default::default()
        }
    }

    pub(crate) fn upserts(&self) -> Vec<VectorRecord> {
        self.upserts.lock().unwrap().clone()
    }

    pub(crate) fn searches(&self) -> Vec<(usize, Option<f32>)> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn has_collection(&self, name: &str) -> bool {
        self.collections.lock().unwrap().contains(name)
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn create_collection(
        &self,
        name: &str,
        _dimension: usize,
        _distance: DistanceMetric,
    ) -> KubeMindResult<()> {
        if self.fail_collections {
            return Err(KubeMindError::vector_store("connection refused"));
        }
        self.collections.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> KubeMindResult<bool> {
        if self.fail_collections {
            return Err(KubeMindError::vector_store("connection refused"));
        }
        Ok(self.collections.lock().unwrap().contains(name))
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> KubeMindResult<()> {
        self.upserts.lock().unwrap().extend(records);
        Ok(())
    }

    async fn search(
        &self,
        _query_vector: &[f32],
        limit: usize,
        min_score: Option<f32>,
    ) -> KubeMindResult<Vec<VectorSearchResult>> {
        self.searches.lock().unwrap().push((limit, min_score));
        if self.fail_search {
            return Err(KubeMindError::vector_store("connection refused"));
        }
        Ok(self.results.clone())
    }

    async fn get(&self, id: &str) -> KubeMindResult<Option<VectorRecord>> {
        Ok(self
            .upserts
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    fn collection_name(&self) -> &str {
        "k8s_incidents"
    }
}

/// A search hit for a stored memory with id `id`.
pub(crate) fn search_hit(id: &str, score: f32) -> VectorSearchResult {
    let resolution = IncidentResolution::new(
        id,
        "prod",
        "default",
        format!("log of {}", id),
        format!("fix for {}", id),
    );
    let record = MemoryRecord::from_resolution(resolution, Vec::new()).into_vector_record();
    VectorSearchResult {
        id: record.id,
        score,
        payload: record.payload,
    }
}

/// Payload-free hit, as returned for points written by something else.
pub(crate) fn bare_hit(id: &str, score: f32) -> VectorSearchResult {
    VectorSearchResult {
        id: id.to_string(),
        score,
        payload: HashMap::new(),
    }
}
