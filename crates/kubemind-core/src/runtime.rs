//! Background runtime for the memory consolidator.
//!
//! Owns the shutdown token and the consolidator task, providing startup and
//! graceful shutdown. A supervising task records when the worker exits and
//! reports an unexpected exit as soon as it happens.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::buffer::{ResolutionBuffer, ResolutionReader};
use crate::consolidation::{
    ConsolidationMetrics, ConsolidationStats, MemoryConsolidator, WorkerState,
};
use crate::error::{KubeMindError, KubeMindResult};

/// Background runtime managing the consolidator lifecycle.
///
/// # Example
///
/// ```ignore
/// use kubemind_core::{BackgroundRuntime, MemoryConsolidator, ResolutionBuffer};
///
/// let (buffer, reader) = ResolutionBuffer::channel(100);
/// let mut runtime = BackgroundRuntime::new(consolidator, reader);
/// runtime.start()?;
///
/// // ... producers write to `buffer` ...
///
/// runtime.shutdown().await;
/// ```
pub struct BackgroundRuntime {
    consolidator: Arc<MemoryConsolidator>,
    reader: Option<ResolutionReader>,
    handle: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    metrics: Arc<ConsolidationMetrics>,
}

impl BackgroundRuntime {
    /// Create a runtime that will drain `reader` with `consolidator`.
    ///
    /// Nothing runs until [`BackgroundRuntime::start`].
    pub fn new(consolidator: MemoryConsolidator, reader: ResolutionReader) -> Self {
        Self::with_cancellation(consolidator, reader, CancellationToken::new())
    }

    /// Create a runtime stopped by `cancel` (or by [`BackgroundRuntime::shutdown`]).
    pub fn with_cancellation(
        consolidator: MemoryConsolidator,
        reader: ResolutionReader,
        cancel: CancellationToken,
    ) -> Self {
        let metrics = consolidator.metrics();
        Self {
            consolidator: Arc::new(consolidator),
            reader: Some(reader),
            handle: None,
            cancel,
            metrics,
        }
    }

    /// Create a buffer of `capacity` and a runtime draining it.
    pub fn with_buffer(
        consolidator: MemoryConsolidator,
        capacity: usize,
    ) -> (ResolutionBuffer, Self) {
        let (buffer, reader) = ResolutionBuffer::channel(capacity);
        (buffer, Self::new(consolidator, reader))
    }

    /// Spawn the consolidator. Can only be called once.
    pub fn start(&mut self) -> KubeMindResult<()> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| KubeMindError::internal("Memory consolidator already started"))?;

        let consolidator = self.consolidator.clone();
        let cancel = self.cancel.clone();
        let worker = tokio::spawn(async move {
            consolidator.run(reader, cancel).await;
        });

        let metrics = self.metrics.clone();
        let cancel = self.cancel.clone();
        metrics.set_worker_state(WorkerState::Running);
        self.handle = Some(tokio::spawn(async move {
            let result = worker.await;
            metrics.set_worker_state(WorkerState::Stopped);
            match result {
                Ok(()) if cancel.is_cancelled() => {}
                Ok(()) => warn!("Memory consolidator exited before shutdown"),
                Err(e) if e.is_panic() => {
                    error!(error = %e, "Memory consolidator terminated with a fatal error");
                }
                Err(e) => debug!(error = %e, "Memory consolidator task aborted"),
            }
        }));

        info!("Background consolidation started");
        Ok(())
    }

    /// Whether the consolidator task is running.
    pub fn is_running(&self) -> bool {
        self.metrics.worker_state() == WorkerState::Running
    }

    /// Token that stops the consolidator when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shared handle to the consolidation counters.
    pub fn metrics(&self) -> Arc<ConsolidationMetrics> {
        self.metrics.clone()
    }

    /// Current consolidation counters.
    pub fn stats(&self) -> ConsolidationStats {
        self.metrics.snapshot()
    }

    /// Stop the consolidator and wait for it.
    ///
    /// Buffered resolutions that were not yet picked up are dropped. A
    /// panic inside the worker is logged, never propagated.
    pub async fn shutdown(&mut self) {
        debug!("Shutting down background consolidation");
        self.cancel.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                debug!(error = %e, "Consolidator supervisor aborted");
            }
        }

        info!(stats = ?self.metrics.snapshot(), "Background consolidation stopped");
    }
}
