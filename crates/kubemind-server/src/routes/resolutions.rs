//! Resolution intake endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use kubemind_core::IncidentResolution;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResolutionResponse {
    pub incident_id: String,
    pub queued: usize,
}

/// Hand a resolution to the memory consolidator.
/// POST /v1/resolutions
///
/// Waits while the buffer is full. Answers 503 if shutdown starts first.
pub async fn submit_resolution(
    State(state): State<AppState>,
    Json(resolution): Json<IncidentResolution>,
) -> ApiResult<(StatusCode, Json<SubmitResolutionResponse>)> {
    if resolution.incident_id.trim().is_empty() {
        return Err(ApiError::validation("incident_id must not be empty"));
    }
    let incident_id = resolution.incident_id.clone();

    state
        .pipeline()
        .record_resolution(resolution, state.shutdown_token())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResolutionResponse {
            incident_id,
            queued: state.pipeline().buffer().len(),
        }),
    ))
}
