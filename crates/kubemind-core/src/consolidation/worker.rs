//! The consolidation worker.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{ConsolidationConfig, ConsolidationMetrics};
use crate::buffer::ResolutionReader;
use crate::error::{ErrorCode, KubeMindError, KubeMindResult};
use crate::redaction::redact_secrets;
use crate::traits::{Embedder, VectorStore};
use crate::types::{IncidentResolution, MemoryRecord};

/// What happened to one resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsolidationOutcome {
    /// The raw log was empty; nothing was embedded or stored.
    SkippedEmpty,
    /// An existing memory was similar enough; nothing was stored.
    Duplicate { existing_id: String, score: f32 },
    /// A new memory record was upserted.
    Stored { id: String },
}

/// Background worker converting resolutions into memory records.
///
/// The only writer to the memory collection.
pub struct MemoryConsolidator {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: ConsolidationConfig,
    metrics: Arc<ConsolidationMetrics>,
}

impl MemoryConsolidator {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: ConsolidationConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
            metrics: Arc::new(ConsolidationMetrics::default()),
        }
    }

    /// Shared handle to the worker's counters.
    pub fn metrics(&self) -> Arc<ConsolidationMetrics> {
        self.metrics.clone()
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Consolidate a single resolution.
    pub async fn consolidate(
        &self,
        resolution: IncidentResolution,
    ) -> KubeMindResult<ConsolidationOutcome> {
        if !resolution.has_log() {
            warn!(
                incident_id = %resolution.incident_id,
                code = ErrorCode::ValEmptyLog.as_str(),
                "Resolution has an empty raw log, skipping consolidation"
            );
            self.metrics.record_skipped();
            return Ok(ConsolidationOutcome::SkippedEmpty);
        }

        let embedding = self.embedder.embed(&resolution.raw_log).await?;
        if embedding.len() != self.config.embedding_dims {
            return Err(KubeMindError::dimension_mismatch(
                self.config.embedding_dims,
                embedding.len(),
            ));
        }

        let nearest = self.store.search(&embedding, 1, None).await?;
        if let Some(hit) = nearest.into_iter().next() {
            if hit.score >= self.config.duplicate_threshold {
                info!(
                    incident_id = %resolution.incident_id,
                    existing_id = %hit.id,
                    score = hit.score,
                    threshold = self.config.duplicate_threshold,
                    "Similar memory already exists, skipping"
                );
                self.metrics.record_duplicate();
                return Ok(ConsolidationOutcome::Duplicate {
                    existing_id: hit.id,
                    score: hit.score,
                });
            }
            debug!(
                incident_id = %resolution.incident_id,
                nearest_id = %hit.id,
                score = hit.score,
                "Nearest memory below duplicate threshold"
            );
        }

        let mut record = MemoryRecord::from_resolution(resolution, embedding);
        if self.config.redact_persisted_logs {
            record.raw_log = redact_secrets(&record.raw_log).into_owned();
            record.resolution_action = redact_secrets(&record.resolution_action).into_owned();
        }

        let id = record.id.clone();
        self.store.upsert(vec![record.into_vector_record()]).await?;
        self.metrics.record_stored();

        info!(incident_id = %id, collection = self.store.collection_name(), "Memory stored");
        Ok(ConsolidationOutcome::Stored { id })
    }

    /// Drain `reader` until `cancel` fires or every writer is gone.
    ///
    /// Items are handled strictly one after another. A failing item is
    /// logged and dropped; the loop moves on to the next one. Cancellation
    /// interrupts an in-flight item and leaves buffered items unprocessed.
    pub async fn run(&self, mut reader: ResolutionReader, cancel: CancellationToken) {
        info!(
            duplicate_threshold = self.config.duplicate_threshold,
            "Memory consolidator started"
        );

        loop {
            let resolution = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = reader.recv() => match next {
                    Some(resolution) => resolution,
                    None => {
                        info!("Resolution buffer closed");
                        break;
                    }
                },
            };

            self.metrics.record_received();
            let incident_id = resolution.incident_id.clone();

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(incident_id = %incident_id, "Shutdown during consolidation, item dropped");
                    break;
                }
                outcome = AssertUnwindSafe(self.consolidate(resolution)).catch_unwind() => outcome,
            };

            match outcome {
                Ok(Ok(_)) => {}
                Ok(Err(e)) if e.is_cancellation() => {
                    info!(incident_id = %incident_id, "Consolidation cancelled");
                    break;
                }
                Ok(Err(e)) => {
                    self.metrics.record_failed();
                    error!(
                        incident_id = %incident_id,
                        error = %e,
                        code = e.code().as_str(),
                        "Failed to consolidate resolution"
                    );
                }
                Err(_) => {
                    self.metrics.record_failed();
                    error!(incident_id = %incident_id, "Consolidation panicked, item dropped");
                }
            }
        }

        info!("Memory consolidator stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ResolutionBuffer;
    use crate::testing::{search_hit, MockEmbedder, MockVectorStore};
    use crate::types::payload_keys;

    fn consolidator(
        embedder: MockEmbedder,
        store: Arc<MockVectorStore>,
    ) -> MemoryConsolidator {
        MemoryConsolidator::new(
            Arc::new(embedder),
            store,
            ConsolidationConfig {
                embedding_dims: 4,
                ..Default::default()
            },
        )
    }

    fn oom(id: &str) -> IncidentResolution {
        IncidentResolution::new(id, "prod", "default", "oom killed", "raise memory limit")
    }

    #[tokio::test]
    async fn test_below_threshold_stores_once() {
        let store = Arc::new(MockVectorStore::with_results(vec![search_hit("OLD-1", 0.80)]));
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());

        let outcome = consolidator.consolidate(oom("INC-1")).await.unwrap();

        assert_eq!(outcome, ConsolidationOutcome::Stored { id: "INC-1".to_string() });
        let upserts = store.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].id, "INC-1");
        assert_eq!(upserts[0].vector.len(), 4);
        assert_eq!(upserts[0].get_string(payload_keys::RAW_LOG), Some("oom killed"));
        assert_eq!(store.searches(), vec![(1, None)]);
    }

    #[tokio::test]
    async fn test_at_or_above_threshold_is_skipped() {
        let store = Arc::new(MockVectorStore::with_results(vec![search_hit("OLD-1", 0.97)]));
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());

        let outcome = consolidator.consolidate(oom("INC-1")).await.unwrap();

        assert_eq!(
            outcome,
            ConsolidationOutcome::Duplicate { existing_id: "OLD-1".to_string(), score: 0.97 }
        );
        assert!(store.upserts().is_empty());
        assert_eq!(consolidator.metrics().snapshot().duplicates, 1);
    }

    #[tokio::test]
    async fn test_score_equal_to_threshold_is_a_duplicate() {
        let store = Arc::new(MockVectorStore::with_results(vec![search_hit("OLD-1", 0.95)]));
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());

        let outcome = consolidator.consolidate(oom("INC-1")).await.unwrap();

        assert!(matches!(outcome, ConsolidationOutcome::Duplicate { .. }));
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn test_score_just_below_threshold_is_stored() {
        let store = Arc::new(MockVectorStore::with_results(vec![search_hit("OLD-1", 0.9499)]));
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());

        consolidator.consolidate(oom("INC-1")).await.unwrap();
        assert_eq!(store.upserts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_store_stores() {
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());

        consolidator.consolidate(oom("INC-1")).await.unwrap();
        assert_eq!(store.upserts().len(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_log_makes_no_calls() {
        let embedder = MockEmbedder::new(4);
        let calls = embedder.call_counter();
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(embedder, store.clone());

        let resolution = IncidentResolution::new("INC-1", "prod", "default", "  \n ", "restart");
        let outcome = consolidator.consolidate(resolution).await.unwrap();

        assert_eq!(outcome, ConsolidationOutcome::SkippedEmpty);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(store.searches().is_empty());
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(MockEmbedder::new(3), store.clone());

        let err = consolidator.consolidate(oom("INC-1")).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValDimensionMismatch);
        assert!(store.upserts().is_empty());
    }

    #[tokio::test]
    async fn test_secrets_are_masked_but_embedding_uses_raw_log() {
        let embedder = MockEmbedder::new(4);
        let seen = embedder.seen_texts();
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(embedder, store.clone());

        let resolution = IncidentResolution::new(
            "INC-1",
            "prod",
            "default",
            "auth failed password=hunter2",
            "rotate token: abc123",
        );
        consolidator.consolidate(resolution).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), ["auth failed password=hunter2"]);
        let stored = &store.upserts()[0];
        assert!(!stored.get_string(payload_keys::RAW_LOG).unwrap().contains("hunter2"));
        assert!(!stored
            .get_string(payload_keys::RESOLUTION_ACTION)
            .unwrap()
            .contains("abc123"));
    }

    #[tokio::test]
    async fn test_run_continues_after_failed_item() {
        let embedder = MockEmbedder::new(4).failing_on("bad log");
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(embedder, store.clone());
        let (buffer, reader) = ResolutionBuffer::channel(4);
        let cancel = CancellationToken::new();

        buffer
            .write(IncidentResolution::new("INC-1", "c", "ns", "bad log", "x"), &cancel)
            .await
            .unwrap();
        buffer.write(oom("INC-2"), &cancel).await.unwrap();
        drop(buffer);

        consolidator.run(reader, cancel).await;

        let upserts = store.upserts();
        assert_eq!(upserts.len(), 1);
        assert_eq!(upserts[0].id, "INC-2");

        let stats = consolidator.metrics().snapshot();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.stored, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel_without_draining() {
        let store = Arc::new(MockVectorStore::default());
        let consolidator = consolidator(MockEmbedder::new(4), store.clone());
        let (buffer, reader) = ResolutionBuffer::channel(4);
        let cancel = CancellationToken::new();

        buffer.write(oom("INC-1"), &cancel).await.unwrap();
        cancel.cancel();

        consolidator.run(reader, cancel).await;
        assert!(store.upserts().is_empty());
    }
}
