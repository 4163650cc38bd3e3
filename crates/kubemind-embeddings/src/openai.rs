//! OpenAI embedding provider implementation.

use async_trait::async_trait;
use tracing::debug;

use kubemind_core::error::{KubeMindError, KubeMindResult};
use kubemind_core::traits::{Embedder, EmbedderConfig};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};

/// OpenAI embedding provider.
pub struct OpenAIEmbedder {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: EmbedderConfig,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder.
    pub fn new(config: EmbedderConfig) -> KubeMindResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                KubeMindError::Configuration(
                    "OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string(),
                )
            })?;

        #[cfg(feature = "openai")]
        let openai_config = match config.base_url {
            Some(ref base_url) => OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(base_url),
            None => OpenAIConfig::new().with_api_key(api_key),
        };
        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        Ok(Self {
            #[cfg(feature = "openai")]
            client: Client::with_config(openai_config),
            config,
        })
    }

    #[cfg(feature = "openai")]
    fn request(&self, input: EmbeddingInput) -> CreateEmbeddingRequest {
        CreateEmbeddingRequest {
            model: self.config.model.clone(),
            input,
            // text-embedding-3 models can shorten their output to the collection dimension.
            dimensions: self
                .config
                .model
                .starts_with("text-embedding-3")
                .then_some(self.config.embedding_dims as u32),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[cfg(feature = "openai")]
    async fn embed(&self, text: &str) -> KubeMindResult<Vec<f32>> {
        let response = self
            .client
            .embeddings()
            .create(self.request(EmbeddingInput::String(text.to_string())))
            .await
            .map_err(|e| KubeMindError::embedding(format!("OpenAI embedding error: {}", e)))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| KubeMindError::embedding("No embedding returned"))?;

        debug!(model = %self.config.model, dims = embedding.embedding.len(), "OpenAI embedding generated");
        Ok(embedding.embedding)
    }

    #[cfg(not(feature = "openai"))]
    async fn embed(&self, _text: &str) -> KubeMindResult<Vec<f32>> {
        Err(KubeMindError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_api_key_is_accepted() {
        let config = EmbedderConfig {
            api_key: Some("sk-test".to_string()),
            embedding_dims: 768,
            ..Default::default()
        };
        let embedder = OpenAIEmbedder::new(config).unwrap();
        assert_eq!(embedder.dimension(), 768);
        assert_eq!(embedder.model_name(), "text-embedding-3-small");
    }
}
