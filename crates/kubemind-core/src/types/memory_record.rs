//! Long-term memory record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{KubeMindError, KubeMindResult};
use crate::traits::{VectorRecord, VectorSearchResult};

use super::IncidentResolution;

/// Payload keys used when a record is stored in a vector store.
pub mod payload_keys {
    pub const CLUSTER_ID: &str = "cluster_id";
    pub const NAMESPACE: &str = "namespace";
    pub const RAW_LOG: &str = "raw_log";
    pub const RESOLUTION_ACTION: &str = "resolution_action";
    pub const CREATED_AT: &str = "created_at";
}

/// A consolidated incident resolution, persisted for future retrieval.
///
/// Immutable once written; only the memory consolidator creates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Record id, equal to the resolution (incident) id.
    pub id: String,
    /// Cluster the incident occurred in.
    pub cluster_id: String,
    /// Namespace of the affected workload.
    pub namespace: String,
    /// Raw log text.
    pub raw_log: String,
    /// Action that resolved the incident.
    pub resolution_action: String,
    /// Embedding of the raw log.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Build a record from a resolution and the embedding of its raw log.
    pub fn from_resolution(resolution: IncidentResolution, embedding: Vec<f32>) -> Self {
        Self {
            id: resolution.incident_id,
            cluster_id: resolution.cluster_id,
            namespace: resolution.namespace,
            raw_log: resolution.raw_log,
            resolution_action: resolution.resolution_text,
            embedding,
            created_at: Utc::now(),
        }
    }

    /// Convert into the generic vector store representation.
    pub fn into_vector_record(self) -> VectorRecord {
        let mut payload = HashMap::new();
        payload.insert(payload_keys::CLUSTER_ID.to_string(), self.cluster_id.into());
        payload.insert(payload_keys::NAMESPACE.to_string(), self.namespace.into());
        payload.insert(payload_keys::RAW_LOG.to_string(), self.raw_log.into());
        payload.insert(
            payload_keys::RESOLUTION_ACTION.to_string(),
            self.resolution_action.into(),
        );
        payload.insert(
            payload_keys::CREATED_AT.to_string(),
            self.created_at.to_rfc3339().into(),
        );

        VectorRecord::new(self.id, self.embedding, payload)
    }

    /// Rebuild a record from a stored payload.
    pub fn from_payload(
        id: impl Into<String>,
        embedding: Vec<f32>,
        payload: &HashMap<String, serde_json::Value>,
    ) -> KubeMindResult<Self> {
        let id = id.into();
        let field = |key: &str| -> KubeMindResult<String> {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    KubeMindError::validation(format!(
                        "memory record '{}' is missing payload field '{}'",
                        id, key
                    ))
                })
        };

        let created_at = DateTime::parse_from_rfc3339(&field(payload_keys::CREATED_AT)?)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                KubeMindError::validation(format!("invalid created_at on '{}': {}", id, e))
            })?;

        Ok(Self {
            cluster_id: field(payload_keys::CLUSTER_ID)?,
            namespace: field(payload_keys::NAMESPACE)?,
            raw_log: field(payload_keys::RAW_LOG)?,
            resolution_action: field(payload_keys::RESOLUTION_ACTION)?,
            embedding,
            created_at,
            id,
        })
    }

    /// Rebuild a record from a stored vector record.
    pub fn from_vector_record(record: VectorRecord) -> KubeMindResult<Self> {
        Self::from_payload(record.id, record.vector, &record.payload)
    }

    /// One-line description used in enriched goals.
    pub fn describe(&self) -> String {
        format!(
            "[{}/{}] {} -> Resolution: {}",
            self.cluster_id,
            self.namespace,
            self.raw_log.trim(),
            self.resolution_action.trim()
        )
    }
}

/// A memory record returned by a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMemory {
    /// The stored record (without its embedding).
    pub record: MemoryRecord,
    /// Similarity to the query, higher is closer.
    pub score: f32,
}

impl TryFrom<VectorSearchResult> for ScoredMemory {
    type Error = KubeMindError;

    fn try_from(result: VectorSearchResult) -> KubeMindResult<Self> {
        Ok(Self {
            record: MemoryRecord::from_payload(result.id, Vec::new(), &result.payload)?,
            score: result.score,
        })
    }
}
