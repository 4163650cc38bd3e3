//! Health check endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use kubemind_core::{ConsolidationStats, WorkerState};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub consolidator: WorkerState,
    pub buffer_capacity: usize,
    pub buffered: usize,
    pub consolidation: ConsolidationStats,
}

/// An exited consolidator outside shutdown is reported as 503.
fn health_status(shutting_down: bool, consolidator: WorkerState) -> (StatusCode, &'static str) {
    if shutting_down {
        (StatusCode::OK, "shutting_down")
    } else if consolidator == WorkerState::Stopped {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    } else {
        (StatusCode::OK, "healthy")
    }
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let buffer = state.pipeline().buffer();
    let consolidator = state.worker_state();
    let (code, status) = health_status(state.shutdown_token().is_cancelled(), consolidator);

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            consolidator,
            buffer_capacity: buffer.capacity(),
            buffered: buffer.len(),
            consolidation: state.stats(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_consolidator_is_degraded() {
        assert_eq!(
            health_status(false, WorkerState::Stopped),
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        );
    }

    #[test]
    fn test_running_or_idle_is_healthy() {
        assert_eq!(health_status(false, WorkerState::Running).1, "healthy");
        assert_eq!(health_status(false, WorkerState::Idle).1, "healthy");
    }

    #[test]
    fn test_shutdown_wins_over_stopped_worker() {
        assert_eq!(
            health_status(true, WorkerState::Stopped),
            (StatusCode::OK, "shutting_down")
        );
    }
}
