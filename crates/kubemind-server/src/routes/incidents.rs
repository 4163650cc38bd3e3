//! Incident intake endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use kubemind_core::{Admission, IncidentContext};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, DEFAULT_GOAL};

/// Request body for submitting an incident.
#[derive(Debug, Deserialize)]
pub struct SubmitIncidentRequest {
    #[serde(flatten)]
    pub incident: IncidentContext,
    /// Goal for the reasoner; a generic diagnosis goal when absent.
    pub goal: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitIncidentResponse {
    pub incident_id: String,
    pub duplicate: bool,
    /// Goal enriched with relevant past resolutions; absent for duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// Run an incident through the dedup gate and memory enrichment.
/// POST /v1/incidents
pub async fn submit_incident(
    State(state): State<AppState>,
    Json(request): Json<SubmitIncidentRequest>,
) -> ApiResult<Json<SubmitIncidentResponse>> {
    let incident = request.incident;
    if incident.incident_id.trim().is_empty() {
        return Err(ApiError::validation("incident_id must not be empty"));
    }
    let goal = request.goal.as_deref().unwrap_or(DEFAULT_GOAL);

    let admission = state
        .pipeline()
        .admit(&incident, goal, state.shutdown_token())
        .await?;

    let response = match admission {
        Admission::Duplicate => SubmitIncidentResponse {
            incident_id: incident.incident_id,
            duplicate: true,
            goal: None,
        },
        Admission::Accepted { goal } => SubmitIncidentResponse {
            incident_id: incident.incident_id,
            duplicate: false,
            goal: Some(goal),
        },
    };
    Ok(Json(response))
}
