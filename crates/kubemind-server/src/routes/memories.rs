//! Memory lookup endpoint.

use axum::{
    extract::{Path, State},
    Json,
};

use kubemind_core::MemoryRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Get a consolidated memory by incident id. The embedding is omitted.
/// GET /v1/memories/:id
pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MemoryRecord>> {
    let record = state
        .memories()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Memory '{}' not found", id)))?;

    let mut memory = MemoryRecord::from_vector_record(record)?;
    memory.embedding.clear();
    Ok(Json(memory))
}
