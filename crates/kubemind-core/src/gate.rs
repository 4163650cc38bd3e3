//! Incident gate: suppresses repeated incident ids within the dedup window.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::GateFailurePolicy;
use crate::error::KubeMindResult;
use crate::traits::DedupStore;

/// Key prefix for dedup markers.
pub const DEDUP_KEY_PREFIX: &str = "incident:";
/// Value stored in a dedup marker.
pub const DEDUP_SENTINEL: &str = "processed";

/// Decides whether an incident id has already been seen in the current window.
///
/// Correct across any number of concurrent callers and processes because the
/// decision is a single `set_if_absent` call on the shared store.
#[derive(Clone)]
pub struct IncidentGate {
    store: Arc<dyn DedupStore>,
    window: Duration,
    failure_policy: GateFailurePolicy,
}

impl IncidentGate {
    /// Create a gate over `store` with the given dedup window.
    pub fn new(
        store: Arc<dyn DedupStore>,
        window: Duration,
        failure_policy: GateFailurePolicy,
    ) -> Self {
        Self {
            store,
            window,
            failure_policy,
        }
    }

    /// The dedup window in effect.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `false` exactly when this call claimed the incident id.
    ///
    /// The first caller within a window wins; later callers get `true` and
    /// the marker's expiry is not extended. On a store failure the
    /// configured [`GateFailurePolicy`] decides between treating the
    /// incident as new and returning the error.
    pub async fn is_duplicate(&self, incident_id: &str) -> KubeMindResult<bool> {
        let key = dedup_key(incident_id);

        match self
            .store
            .set_if_absent(&key, DEDUP_SENTINEL, self.window)
            .await
        {
            Ok(true) => {
                debug!(incident_id = %incident_id, "New incident, marker created");
                Ok(false)
            }
            Ok(false) => {
                info!(
                    incident_id = %incident_id,
                    window_secs = self.window.as_secs(),
                    "Duplicate incident suppressed"
                );
                Ok(true)
            }
            Err(e) => match self.failure_policy {
                GateFailurePolicy::FailOpen => {
                    warn!(
                        incident_id = %incident_id,
                        backend = self.store.backend(),
                        error = %e,
                        "Dedup store unavailable, treating incident as new"
                    );
                    Ok(false)
                }
                GateFailurePolicy::FailClosed => Err(e),
            },
        }
    }
}

/// Dedup store key for an incident id.
pub fn dedup_key(incident_id: &str) -> String {
    format!("{}{}", DEDUP_KEY_PREFIX, incident_id)
}
