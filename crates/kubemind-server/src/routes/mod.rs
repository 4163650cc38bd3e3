//! Route definitions for the HTTP API.

mod health;
mod incidents;
mod memories;
mod resolutions;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Incident intake
        .route("/v1/incidents", post(incidents::submit_incident))
        .route("/v1/resolutions", post(resolutions::submit_resolution))
        // Memory lookup
        .route("/v1/memories/:id", get(memories::get_memory))
        // Attach state
        .with_state(state)
}

pub use health::*;
pub use incidents::*;
pub use memories::*;
pub use resolutions::*;
