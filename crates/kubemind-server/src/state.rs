//! Server state management.

use std::sync::Arc;

use kubemind_core::consolidation::{ConsolidationMetrics, ConsolidationStats};
use kubemind_core::traits::VectorStore;
use kubemind_core::{IncidentPipeline, WorkerState};
use tokio_util::sync::CancellationToken;

/// Goal used when an incident is posted without one.
pub const DEFAULT_GOAL: &str =
    "Diagnose the root cause of the failing pod and recommend a remediation.";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pipeline: IncidentPipeline,
    memories: Arc<dyn VectorStore>,
    metrics: Arc<ConsolidationMetrics>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        pipeline: IncidentPipeline,
        memories: Arc<dyn VectorStore>,
        metrics: Arc<ConsolidationMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pipeline,
            memories,
            metrics,
            shutdown,
        }
    }

    pub fn pipeline(&self) -> &IncidentPipeline {
        &self.pipeline
    }

    /// Store holding consolidated memories.
    pub fn memories(&self) -> &dyn VectorStore {
        &*self.memories
    }

    pub fn stats(&self) -> ConsolidationStats {
        self.metrics.snapshot()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.metrics.worker_state()
    }

    /// Fires when the process starts shutting down; handlers stop waiting on it.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
