//! Incident, resolution and diagnosis types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// An incident reported by an observer.
///
/// Immutable input. The memory pipeline only reads `incident_id`,
/// `pod_namespace`, `failure_reason` and `logs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentContext {
    /// Unique incident identifier.
    pub incident_id: String,
    /// Name of the failing pod.
    #[serde(default)]
    pub pod_name: String,
    /// Namespace of the failing pod.
    pub pod_namespace: String,
    /// Kubernetes failure reason, e.g. `OOMKilled`.
    pub failure_reason: String,
    /// Tail of the container logs.
    #[serde(default)]
    pub logs: String,
    /// Related manifests, serialized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<String>,
    /// When the observer saw the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl IncidentContext {
    /// Create an incident with the fields the memory pipeline reads.
    pub fn new(
        incident_id: impl Into<String>,
        pod_namespace: impl Into<String>,
        failure_reason: impl Into<String>,
        logs: impl Into<String>,
    ) -> Self {
        Self {
            incident_id: incident_id.into(),
            pod_name: String::new(),
            pod_namespace: pod_namespace.into(),
            failure_reason: failure_reason.into(),
            logs: logs.into(),
            manifests: None,
            timestamp: None,
        }
    }

    /// Text used to look up similar past incidents: `"<reason>: <logs>"`.
    pub fn search_query(&self) -> String {
        format!("{}: {}", self.failure_reason, self.logs)
    }
}

/// The outcome of a completed reasoning step, handed to the resolution buffer.
///
/// Owned by the caller until written to the buffer, then by the consolidator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentResolution {
    /// Incident identifier; also the id of the memory record.
    pub incident_id: String,
    /// Cluster the incident occurred in.
    pub cluster_id: String,
    /// Namespace of the affected workload.
    pub namespace: String,
    /// Raw log text that characterizes the failure.
    pub raw_log: String,
    /// What resolved it.
    pub resolution_text: String,
}

impl IncidentResolution {
    /// Create a new resolution.
    pub fn new(
        incident_id: impl Into<String>,
        cluster_id: impl Into<String>,
        namespace: impl Into<String>,
        raw_log: impl Into<String>,
        resolution_text: impl Into<String>,
    ) -> Self {
        Self {
            incident_id: incident_id.into(),
            cluster_id: cluster_id.into(),
            namespace: namespace.into(),
            raw_log: raw_log.into(),
            resolution_text: resolution_text.into(),
        }
    }

    /// Build a resolution for `incident` from a reasoner's diagnosis.
    pub fn from_diagnosis(
        incident: &IncidentContext,
        cluster_id: impl Into<String>,
        diagnosis: &IncidentDiagnosis,
    ) -> Self {
        Self::new(
            incident.incident_id.clone(),
            cluster_id,
            incident.pod_namespace.clone(),
            incident.logs.clone(),
            diagnosis.resolution_text(),
        )
    }

    /// Id of the memory record this resolution consolidates into.
    pub fn id(&self) -> &str {
        &self.incident_id
    }

    /// Whether the raw log carries any text to embed.
    pub fn has_log(&self) -> bool {
        !self.raw_log.trim().is_empty()
    }
}

/// Confidence the reasoner attaches to a diagnosis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Structured diagnosis produced by the reasoning step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDiagnosis {
    /// Concise summary of the most likely root cause.
    pub root_cause: String,
    /// Reasoner's confidence in the diagnosis.
    pub confidence: Confidence,
    /// Specific, actionable remediation.
    pub recommended_action: String,
    /// Key log lines or manifest snippets backing the diagnosis.
    #[serde(default)]
    pub supporting_evidence: String,
}

impl IncidentDiagnosis {
    /// Text stored as the memory's resolution action.
    pub fn resolution_text(&self) -> String {
        format!(
            "{} (root cause: {}; confidence: {})",
            self.recommended_action, self.root_cause, self.confidence
        )
    }
}
