//! Builds providers and pipeline components from configuration.

use std::sync::Arc;

use kubemind_core::config::{KubeMindConfig, Settings};
use kubemind_core::error::KubeMindResult;
use kubemind_core::traits::{DedupStore, Embedder, VectorStore};
use kubemind_core::{
    BackgroundRuntime, IncidentGate, IncidentPipeline, MemoryConsolidator, MemoryRetriever,
    ResolutionBuffer,
};
use kubemind_dedup_stores::DedupStoreFactory;
use kubemind_embeddings::EmbedderFactory;
use kubemind_vector_stores::VectorStoreFactory;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// External services the pipeline talks to.
#[derive(Clone)]
pub struct Providers {
    pub embedder: Arc<dyn Embedder>,
    pub vector_store: Arc<dyn VectorStore>,
    pub dedup_store: Arc<dyn DedupStore>,
}

/// Create the embedder, vector store and dedup store named in `config`.
pub async fn create_providers(
    config: &KubeMindConfig,
    settings: &Settings,
) -> KubeMindResult<Providers> {
    let mut embedder_config = config.embedder.config.clone();
    embedder_config.embedding_dims = settings.embedding_dims;
    let embedder = EmbedderFactory::create(config.embedder.provider, embedder_config)?;

    let vector_store = VectorStoreFactory::create(config.vector_store.clone()).await?;
    let dedup_store = DedupStoreFactory::create(config.dedup_store.clone()).await?;

    Ok(Providers {
        embedder,
        vector_store,
        dedup_store,
    })
}

/// Wire the gate, retriever, buffer and consolidator around `providers`.
///
/// The returned runtime is not started. `shutdown` is shared by the runtime
/// and by request handlers waiting on the buffer.
pub fn assemble(
    settings: &Settings,
    providers: Providers,
    shutdown: CancellationToken,
) -> (AppState, BackgroundRuntime) {
    let gate = IncidentGate::new(
        providers.dedup_store,
        settings.dedup_window,
        settings.gate_failure_policy,
    );
    let retriever = MemoryRetriever::new(
        providers.embedder.clone(),
        providers.vector_store.clone(),
        settings.retrieval.clone(),
    );
    let consolidator = MemoryConsolidator::new(
        providers.embedder,
        providers.vector_store.clone(),
        settings.consolidation.clone(),
    );

    let (buffer, reader) = ResolutionBuffer::channel(settings.buffer_capacity);
    let runtime = BackgroundRuntime::with_cancellation(consolidator, reader, shutdown.clone());

    let pipeline = IncidentPipeline::new(gate, retriever, buffer, settings.cluster_id.clone());
    let state = AppState::new(pipeline, providers.vector_store, runtime.metrics(), shutdown);
    (state, runtime)
}
