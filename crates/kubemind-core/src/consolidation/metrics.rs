//! Counters for the consolidation worker.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Running totals, updated by the consolidator and read by anyone.
#[derive(Debug, Default)]
pub struct ConsolidationMetrics {
    received: AtomicU64,
    stored: AtomicU64,
    duplicates: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    worker: AtomicU8,
}

/// Lifecycle of the consolidator task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Not started yet.
    #[default]
    Idle,
    Running,
    /// Exited, by shutdown or otherwise.
    Stopped,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

/// Point-in-time copy of [`ConsolidationMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsolidationStats {
    pub received: u64,
    pub stored: u64,
    pub duplicates: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl ConsolidationMetrics {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_worker_state(&self, state: WorkerState) {
        self.worker.store(state as u8, Ordering::Release);
    }

    /// Current lifecycle of the consolidator task.
    pub fn worker_state(&self) -> WorkerState {
        WorkerState::from_u8(self.worker.load(Ordering::Acquire))
    }

    /// Read all counters.
    pub fn snapshot(&self) -> ConsolidationStats {
        ConsolidationStats {
            received: self.received.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_updates() {
        let metrics = ConsolidationMetrics::default();
        metrics.record_received();
        metrics.record_received();
        metrics.record_stored();
        metrics.record_failed();

        let stats = metrics.snapshot();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.duplicates, 0);
    }

    #[test]
    fn test_worker_state_transitions() {
        let metrics = ConsolidationMetrics::default();
        assert_eq!(metrics.worker_state(), WorkerState::Idle);
        metrics.set_worker_state(WorkerState::Running);
        assert_eq!(metrics.worker_state(), WorkerState::Running);
        metrics.set_worker_state(WorkerState::Stopped);
        assert_eq!(metrics.worker_state(), WorkerState::Stopped);
    }
}
