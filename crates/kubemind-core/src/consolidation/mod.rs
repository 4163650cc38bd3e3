//! Memory consolidation: turns buffered resolutions into long-term memories.
//!
//! A single [`MemoryConsolidator`] drains the resolution buffer, one item at
//! a time:
//!
//! 1. skip resolutions with an empty raw log
//! 2. embed the raw log
//! 3. look up the nearest stored memory
//! 4. skip when it is at least `duplicate_threshold` similar
//! 5. otherwise upsert a new [`MemoryRecord`](crate::types::MemoryRecord)
//!
//! Sequential processing keeps the duplicate check race-free: two similar
//! resolutions can never both pass step 4 before either is written.

mod metrics;
mod worker;

pub use metrics::{ConsolidationMetrics, ConsolidationStats, WorkerState};
pub use worker::{ConsolidationOutcome, MemoryConsolidator};

use crate::config::DEFAULT_DUPLICATE_THRESHOLD;

/// Settings for the memory consolidator.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationConfig {
    /// Similarity at or above which a resolution is already represented.
    pub duplicate_threshold: f32,
    /// Dimension every embedding must have.
    pub embedding_dims: usize,
    /// Mask secrets in the stored raw log and resolution text.
    pub redact_persisted_logs: bool,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            embedding_dims: 768,
            redact_persisted_logs: true,
        }
    }
}
