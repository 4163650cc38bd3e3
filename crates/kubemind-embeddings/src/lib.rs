//! kubemind-embeddings - Embedding provider implementations for kubemind.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - text-embedding-3-small, text-embedding-3-large, etc.
//! - **Ollama** (feature: `ollama`) - Local embedding models via Ollama
//! - **Vertex AI** - Google `text-embedding-004` through the REST predict endpoint
//!
//! # Example
//!
//! ```ignore
//! use kubemind_embeddings::EmbedderFactory;
//!
//! // Create an OpenAI embedder
//! let embedder = EmbedderFactory::openai()?;
//!
//! // Create a Vertex AI embedder
//! let embedder = EmbedderFactory::vertex_ai("my-gcp-project")?;
//! ```

mod factory;
mod ollama;
mod openai;
mod vertex_ai;

pub use factory::EmbedderFactory;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;
pub use vertex_ai::VertexAIEmbedder;

// Re-export core types for convenience
pub use kubemind_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};
