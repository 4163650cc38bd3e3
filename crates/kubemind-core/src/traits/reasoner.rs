//! Reasoner trait: the external step that decides what to do with an incident.

use async_trait::async_trait;

use crate::error::KubeMindResult;
use crate::types::{IncidentContext, IncidentDiagnosis};

/// The reasoning/tool-invocation loop that works an admitted incident.
///
/// The pipeline only hands it the incident and the enriched goal; prompt
/// content, model selection and remediation are the implementor's concern.
#[async_trait]
pub trait IncidentReasoner: Send + Sync {
    /// Work the incident towards `goal`.
    ///
    /// Returns `Ok(None)` when the loop finished without a resolution worth
    /// remembering.
    async fn resolve(
        &self,
        incident: &IncidentContext,
        goal: &str,
    ) -> KubeMindResult<Option<IncidentDiagnosis>>;
}
