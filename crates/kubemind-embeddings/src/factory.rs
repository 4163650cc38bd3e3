//! Factory for creating embedding providers.

use std::sync::Arc;
use tracing::info;

use kubemind_core::error::{KubeMindError, KubeMindResult};
use kubemind_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};

use crate::ollama::OllamaEmbedder;
use crate::openai::OpenAIEmbedder;
use crate::vertex_ai::{VertexAIEmbedder, DEFAULT_MODEL};

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from the given configuration.
    pub fn create(
        provider: EmbedderProvider,
        config: EmbedderConfig,
    ) -> KubeMindResult<Arc<dyn Embedder>> {
        let embedder: Arc<dyn Embedder> = match provider {
            #[cfg(feature = "openai")]
            EmbedderProvider::OpenAI => Arc::new(OpenAIEmbedder::new(config)?),
            #[cfg(feature = "ollama")]
            EmbedderProvider::Ollama => Arc::new(OllamaEmbedder::new(config)?),
            EmbedderProvider::VertexAI => Arc::new(VertexAIEmbedder::new(config)?),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(KubeMindError::UnsupportedProvider {
                    provider: format!("{:?}", provider),
                })
            }
        };

        info!(
            provider = ?provider,
            model = embedder.model_name(),
            dims = embedder.dimension(),
            "Embedder created"
        );
        Ok(embedder)
    }

    /// Create an OpenAI embedder with default configuration.
    pub fn openai() -> KubeMindResult<Arc<dyn Embedder>> {
        Self::create(EmbedderProvider::OpenAI, EmbedderConfig::default())
    }

    /// Create an OpenAI embedder with a specific model.
    pub fn openai_with_model(
        model: impl Into<String>,
        dims: usize,
    ) -> KubeMindResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::OpenAI, config)
    }

    /// Create an Ollama embedder with default configuration.
    pub fn ollama() -> KubeMindResult<Arc<dyn Embedder>> {
        Self::ollama_with_model("nomic-embed-text", 768)
    }

    /// Create an Ollama embedder with a specific model.
    pub fn ollama_with_model(
        model: impl Into<String>,
        dims: usize,
    ) -> KubeMindResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        };
        Self::create(EmbedderProvider::Ollama, config)
    }

    /// Create a Vertex AI `text-embedding-004` embedder for `project_id`.
    pub fn vertex_ai(project_id: impl Into<String>) -> KubeMindResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: DEFAULT_MODEL.to_string(),
            embedding_dims: 768,
            project_id: Some(project_id.into()),
            ..Default::default()
        };
        Self::create(EmbedderProvider::VertexAI, config)
    }
}
