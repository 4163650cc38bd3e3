//! kubemind-core - Cognitive memory for Kubernetes incident response.
//!
//! This crate provides the traits, types and components that remember how
//! past incidents were resolved and feed that knowledge back into new ones:
//!
//! - [`IncidentGate`] suppresses repeated incident ids within a dedup window
//! - [`ResolutionBuffer`] hands resolutions to the consolidator with backpressure
//! - [`MemoryConsolidator`] embeds, deduplicates and stores resolutions
//! - [`MemoryRetriever`] enriches a goal with similar past resolutions
//! - [`CollectionInitializer`] creates the memory collection at startup
//!
//! # Example
//!
//! ```ignore
//! use kubemind_core::{IncidentContext, IncidentPipeline, KubeMindConfig};
//!
//! let config = KubeMindConfig::from_env();
//! let pipeline = IncidentPipeline::new(gate, retriever, buffer, &config.cluster_id);
//!
//! let outcome = pipeline
//!     .handle(&incident, "Diagnose the failing pod.", &reasoner, &cancel)
//!     .await?;
//! ```

pub mod buffer;
pub mod config;
pub mod consolidation;
pub mod error;
pub mod gate;
pub mod initializer;
pub mod pipeline;
pub mod redaction;
pub mod retrieval;
pub mod runtime;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use buffer::{ResolutionBuffer, ResolutionReader};
pub use config::{GateFailurePolicy, KubeMindConfig, Settings};
pub use consolidation::{
    ConsolidationConfig, ConsolidationMetrics, ConsolidationOutcome, ConsolidationStats,
    MemoryConsolidator, WorkerState,
};
pub use error::{ErrorCode, KubeMindError, KubeMindResult};
pub use gate::IncidentGate;
pub use initializer::CollectionInitializer;
pub use pipeline::{Admission, IncidentPipeline, PipelineOutcome};
pub use redaction::redact_secrets;
pub use retrieval::{MemoryRetriever, RetrievalConfig};
pub use runtime::BackgroundRuntime;
pub use traits::{
    DedupStore, DedupStoreConfig, DedupStoreProvider, DistanceMetric, Embedder, EmbedderConfig,
    EmbedderProvider, IncidentReasoner, VectorRecord, VectorSearchResult, VectorStore,
    VectorStoreConfig, VectorStoreProvider,
};
pub use types::{
    Confidence, IncidentContext, IncidentDiagnosis, IncidentResolution, MemoryRecord,
    ScoredMemory,
};
