//! Integration tests for the in-process vector store.

use std::collections::HashMap;

use kubemind_core::{CollectionInitializer, ErrorCode};
use kubemind_vector_stores::{
    DistanceMetric, InMemoryVectorStore, VectorRecord, VectorStore, VectorStoreFactory,
};

fn record(id: &str, vector: Vec<f32>, raw_log: &str) -> VectorRecord {
    let mut payload = HashMap::new();
    payload.insert("raw_log".to_string(), serde_json::json!(raw_log));
    VectorRecord::new(id, vector, payload)
}

async fn ready_store() -> InMemoryVectorStore {
    let store = InMemoryVectorStore::new("k8s_incidents", 3);
    store
        .create_collection("k8s_incidents", 3, DistanceMetric::Cosine)
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_operations_fail_before_collection_exists() {
    let store = InMemoryVectorStore::new("k8s_incidents", 3);

    let err = store
        .upsert(vec![record("INC-1", vec![1.0, 0.0, 0.0], "oom")])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::VecCollectionNotFound);

    let err = store.search(&[1.0, 0.0, 0.0], 1, None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::VecCollectionNotFound);
}

#[tokio::test]
async fn test_initializer_creates_once() {
    let store = VectorStoreFactory::memory("k8s_incidents", 3);
    let initializer = CollectionInitializer::new(store.clone(), "k8s_incidents", 3);

    assert!(initializer.initialize().await);
    assert!(store.collection_exists("k8s_incidents").await.unwrap());

    // Second run finds the collection and leaves it alone.
    assert!(initializer.initialize().await);
}

#[tokio::test]
async fn test_search_orders_by_similarity() {
    let store = ready_store().await;
    store
        .upsert(vec![
            record("INC-1", vec![1.0, 0.0, 0.0], "oom killed"),
            record("INC-2", vec![0.8, 0.6, 0.0], "memory pressure"),
            record("INC-3", vec![0.0, 0.0, 1.0], "image pull backoff"),
        ])
        .await
        .unwrap();

    let results = store.search(&[1.0, 0.0, 0.0], 2, None).await.unwrap();
    let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["INC-1", "INC-2"]);
    assert!((results[0].score - 1.0).abs() < 1e-6);
    assert!((results[1].score - 0.8).abs() < 1e-6);
    assert_eq!(results[1].get_string("raw_log"), Some("memory pressure"));
}

#[tokio::test]
async fn test_search_min_score_filters() {
    let store = ready_store().await;
    store
        .upsert(vec![
            record("INC-1", vec![1.0, 0.0, 0.0], "oom killed"),
            record("INC-2", vec![0.6, 0.8, 0.0], "memory pressure"),
        ])
        .await
        .unwrap();

    let results = store.search(&[1.0, 0.0, 0.0], 10, Some(0.75)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "INC-1");
}

#[tokio::test]
async fn test_upsert_replaces_same_id() {
    let store = ready_store().await;
    store
        .upsert(vec![record("INC-1", vec![1.0, 0.0, 0.0], "first")])
        .await
        .unwrap();
    store
        .upsert(vec![record("INC-1", vec![0.0, 1.0, 0.0], "second")])
        .await
        .unwrap();

    assert_eq!(store.len(), 1);
    let stored = store.get("INC-1").await.unwrap().unwrap();
    assert_eq!(stored.get_string("raw_log"), Some("second"));
    assert_eq!(stored.vector, vec![0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn test_wrong_dimension_is_rejected() {
    let store = ready_store().await;

    let err = store
        .upsert(vec![record("INC-1", vec![1.0, 0.0], "short")])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
    assert!(store.is_empty());

    let err = store.search(&[1.0; 4], 1, None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let store = ready_store().await;
    assert!(store.get("INC-404").await.unwrap().is_none());
}
