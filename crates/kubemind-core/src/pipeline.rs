//! Incident pipeline: gate, enrichment, reasoning, then the resolution buffer.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::buffer::ResolutionBuffer;
use crate::error::{KubeMindError, KubeMindResult};
use crate::gate::IncidentGate;
use crate::retrieval::MemoryRetriever;
use crate::traits::IncidentReasoner;
use crate::types::{IncidentContext, IncidentDiagnosis, IncidentResolution};

/// Result of passing an incident through the gate and retriever.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Already seen within the dedup window; do nothing.
    Duplicate,
    /// New incident, with the goal to hand to the reasoner.
    Accepted { goal: String },
}

/// Result of handling an incident end to end.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Suppressed by the gate.
    Duplicate,
    /// The reasoner finished without a diagnosis.
    Unresolved,
    /// The reasoner produced a diagnosis; its resolution is buffered.
    Resolved {
        diagnosis: IncidentDiagnosis,
        resolution: IncidentResolution,
    },
}

/// Composes the memory components around an external reasoning step.
#[derive(Clone)]
pub struct IncidentPipeline {
    gate: IncidentGate,
    retriever: MemoryRetriever,
    buffer: ResolutionBuffer,
    cluster_id: Arc<str>,
}

impl IncidentPipeline {
    pub fn new(
        gate: IncidentGate,
        retriever: MemoryRetriever,
        buffer: ResolutionBuffer,
        cluster_id: impl Into<String>,
    ) -> Self {
        Self {
            gate,
            retriever,
            buffer,
            cluster_id: Arc::from(cluster_id.into()),
        }
    }

    pub fn buffer(&self) -> &ResolutionBuffer {
        &self.buffer
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    /// Run the gate and, for a new incident, enrich `original_goal`.
    pub async fn admit(
        &self,
        incident: &IncidentContext,
        original_goal: &str,
        cancel: &CancellationToken,
    ) -> KubeMindResult<Admission> {
        info!(
            incident_id = %incident.incident_id,
            namespace = %incident.pod_namespace,
            reason = %incident.failure_reason,
            "Incident received"
        );

        let duplicate = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(KubeMindError::cancelled("incident gate")),
            duplicate = self.gate.is_duplicate(&incident.incident_id) => duplicate?,
        };
        if duplicate {
            return Ok(Admission::Duplicate);
        }

        let goal = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(KubeMindError::cancelled("memory retrieval")),
            goal = self.retriever.enrich_goal(incident, original_goal) => goal,
        };
        Ok(Admission::Accepted { goal })
    }

    /// Hand a resolution to the consolidator, waiting while the buffer is full.
    pub async fn record_resolution(
        &self,
        resolution: IncidentResolution,
        cancel: &CancellationToken,
    ) -> KubeMindResult<()> {
        self.buffer.write(resolution, cancel).await
    }

    /// Admit the incident, let `reasoner` work it, and buffer its resolution.
    ///
    /// A duplicate never reaches the reasoner or the buffer.
    pub async fn handle(
        &self,
        incident: &IncidentContext,
        original_goal: &str,
        reasoner: &dyn IncidentReasoner,
        cancel: &CancellationToken,
    ) -> KubeMindResult<PipelineOutcome> {
        let goal = match self.admit(incident, original_goal, cancel).await? {
            Admission::Duplicate => return Ok(PipelineOutcome::Duplicate),
            Admission::Accepted { goal } => goal,
        };

        let diagnosis = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(KubeMindError::cancelled("incident reasoning")),
            diagnosis = reasoner.resolve(incident, &goal) => diagnosis?,
        };

        let Some(diagnosis) = diagnosis else {
            info!(incident_id = %incident.incident_id, "No diagnosis produced");
            return Ok(PipelineOutcome::Unresolved);
        };

        info!(
            incident_id = %incident.incident_id,
            confidence = %diagnosis.confidence,
            "Diagnosis produced"
        );

        let resolution =
            IncidentResolution::from_diagnosis(incident, &*self.cluster_id, &diagnosis);
        self.record_resolution(resolution.clone(), cancel).await?;

        Ok(PipelineOutcome::Resolved {
            diagnosis,
            resolution,
        })
    }
}
