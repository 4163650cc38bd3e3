use std::sync::Arc;
use tracing::{debug, info, warn};

use super::RetrievalConfig;
use crate::error::{KubeMindError, KubeMindResult};
use crate::traits::{Embedder, VectorStore};
use crate::types::{IncidentContext, ScoredMemory};

/// First line of the appended context block.
pub const CONTEXT_HEADER: &str = "--- Relevant Historical Context ---";
/// Last line of the appended context block.
pub const CONTEXT_FOOTER: &str = "--- End of Context ---";

/// Looks up past resolutions similar to an incident. Read-only.
#[derive(Clone)]
pub struct MemoryRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl MemoryRetriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Append the most similar past resolutions to `original_goal`.
    ///
    /// Returns `original_goal` unchanged when nothing qualifies or when the
    /// lookup fails; enrichment never blocks incident handling.
    pub async fn enrich_goal(&self, incident: &IncidentContext, original_goal: &str) -> String {
        match self.relevant_memories(incident).await {
            Ok(memories) if memories.is_empty() => {
                info!(incident_id = %incident.incident_id, "No relevant memories found");
                original_goal.to_string()
            }
            Ok(memories) => {
                info!(
                    incident_id = %incident.incident_id,
                    count = memories.len(),
                    top_score = memories[0].score,
                    "Found relevant memories"
                );
                format!("{}{}", original_goal, format_context(&memories))
            }
            Err(e) => {
                warn!(
                    incident_id = %incident.incident_id,
                    error = %e,
                    "Memory lookup failed, continuing without enrichment"
                );
                original_goal.to_string()
            }
        }
    }

    /// Memories at or above the relevance threshold, closest first, at most
    /// `limit` of them.
    pub async fn relevant_memories(
        &self,
        incident: &IncidentContext,
    ) -> KubeMindResult<Vec<ScoredMemory>> {
        let query = incident.search_query();
        let embedding = self.embedder.embed(&query).await?;
        if embedding.len() != self.config.embedding_dims {
            return Err(KubeMindError::dimension_mismatch(
                self.config.embedding_dims,
                embedding.len(),
            ));
        }

        let threshold = self.config.relevance_threshold;
        let hits = self
            .store
            .search(&embedding, self.config.limit, Some(threshold))
            .await?;

        let mut memories: Vec<ScoredMemory> = hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .filter_map(|hit| {
                let id = hit.id.clone();
                match ScoredMemory::try_from(hit) {
                    Ok(memory) => Some(memory),
                    Err(e) => {
                        debug!(memory_id = %id, error = %e, "Skipping unreadable memory");
                        None
                    }
                }
            })
            .collect();

        memories.sort_by(|a, b| b.score.total_cmp(&a.score));
        memories.truncate(self.config.limit);
        Ok(memories)
    }
}

/// Render memories as the block appended to a goal.
pub fn format_context(memories: &[ScoredMemory]) -> String {
    let mut block = format!("\n\n{}\n", CONTEXT_HEADER);
    for memory in memories {
        block.push_str("- Past Incident/Runbook: ");
        block.push_str(&memory.record.describe());
        block.push('\n');
    }
    block.push_str(CONTEXT_FOOTER);
    block.push('\n');
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bare_hit, search_hit, MockEmbedder, MockVectorStore};

    const GOAL: &str = "Diagnose the failing pod and propose a fix.";

    fn retriever(embedder: MockEmbedder, store: Arc<MockVectorStore>) -> MemoryRetriever {
        MemoryRetriever::new(
            Arc::new(embedder),
            store,
            RetrievalConfig {
                embedding_dims: 4,
                ..Default::default()
            },
        )
    }

    fn incident() -> IncidentContext {
        IncidentContext::new("INC-1", "default", "OOMKilled", "oom killed")
    }

    #[tokio::test]
    async fn test_no_qualifying_match_returns_goal_unchanged() {
        let store = Arc::new(MockVectorStore::with_results(vec![
            search_hit("OLD-1", 0.74),
            search_hit("OLD-2", 0.5),
        ]));
        let retriever = retriever(MockEmbedder::new(4), store);

        let goal = retriever.enrich_goal(&incident(), GOAL).await;
        assert_eq!(goal, GOAL);
    }

    #[tokio::test]
    async fn test_matches_are_listed_closest_first() {
        let store = Arc::new(MockVectorStore::with_results(vec![
            search_hit("B", 0.85),
            search_hit("C", 0.76),
            search_hit("A", 0.90),
        ]));
        let retriever = retriever(MockEmbedder::new(4), store.clone());

        let goal = retriever.enrich_goal(&incident(), GOAL).await;

        assert!(goal.starts_with(GOAL));
        let block = &goal[GOAL.len()..];
        assert!(block.starts_with("\n\n--- Relevant Historical Context ---\n"));
        assert!(block.ends_with("--- End of Context ---\n"));

        let entries: Vec<&str> = block
            .lines()
            .filter(|l| l.starts_with("- Past Incident/Runbook: "))
            .collect();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].contains("log of A"));
        assert!(entries[1].contains("log of B"));
        assert!(entries[2].contains("log of C"));

        assert_eq!(store.searches(), vec![(3, Some(0.75))]);
    }

    #[tokio::test]
    async fn test_score_equal_to_threshold_is_included() {
        let store = Arc::new(MockVectorStore::with_results(vec![
            search_hit("EDGE", 0.75),
            search_hit("BELOW", 0.7499),
        ]));
        let retriever = retriever(MockEmbedder::new(4), store);

        let memories = retriever.relevant_memories(&incident()).await.unwrap();
        let ids: Vec<&str> = memories.iter().map(|m| m.record.id.as_str()).collect();
        assert_eq!(ids, vec!["EDGE"]);
    }

    #[tokio::test]
    async fn test_results_are_bounded_by_limit() {
        let store = Arc::new(MockVectorStore::with_results(vec![
            search_hit("A", 0.99),
            search_hit("B", 0.95),
            search_hit("C", 0.90),
            search_hit("D", 0.80),
        ]));
        let retriever = retriever(MockEmbedder::new(4), store);

        let memories = retriever.relevant_memories(&incident()).await.unwrap();
        let ids: Vec<&str> = memories.iter().map(|m| m.record.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_query_joins_reason_and_logs() {
        let embedder = MockEmbedder::new(4);
        let seen = embedder.seen_texts();
        let retriever = retriever(embedder, Arc::new(MockVectorStore::default()));

        retriever.enrich_goal(&incident(), GOAL).await;
        assert_eq!(seen.lock().unwrap().as_slice(), ["OOMKilled: oom killed"]);
    }

    #[tokio::test]
    async fn test_embedding_failure_returns_goal_unchanged() {
        let retriever = retriever(MockEmbedder::failing(4), Arc::new(MockVectorStore::default()));
        assert_eq!(retriever.enrich_goal(&incident(), GOAL).await, GOAL);
    }

    #[tokio::test]
    async fn test_search_failure_returns_goal_unchanged() {
        let retriever = retriever(MockEmbedder::new(4), Arc::new(MockVectorStore::failing()));
        assert_eq!(retriever.enrich_goal(&incident(), GOAL).await, GOAL);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_returns_goal_unchanged() {
        let store = Arc::new(MockVectorStore::with_results(vec![search_hit("A", 0.9)]));
        let retriever = retriever(MockEmbedder::new(8), store);
        assert_eq!(retriever.enrich_goal(&incident(), GOAL).await, GOAL);
    }

    #[tokio::test]
    async fn test_unreadable_payload_is_skipped() {
        let store = Arc::new(MockVectorStore::with_results(vec![
            bare_hit("FOREIGN", 0.99),
            search_hit("A", 0.80),
        ]));
        let retriever = retriever(MockEmbedder::new(4), store);

        let memories = retriever.relevant_memories(&incident()).await.unwrap();
        assert_eq!(memories.len(), 1);
        assert_eq!(memories[0].record.id, "A");
    }
}
