//! Memory retrieval: enriches an incident goal with similar past resolutions.

mod enrichment;

pub use enrichment::{format_context, MemoryRetriever, CONTEXT_FOOTER, CONTEXT_HEADER};

use crate::config::{DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_RETRIEVAL_LIMIT};

/// Settings for the memory retriever.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalConfig {
    /// Minimum similarity for a memory to be used.
    pub relevance_threshold: f32,
    /// Maximum number of memories appended to a goal.
    pub limit: usize,
    /// Dimension every query embedding must have.
    pub embedding_dims: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            limit: DEFAULT_RETRIEVAL_LIMIT,
            embedding_dims: 768,
        }
    }
}
