//! Configuration system for kubemind.
//!
//! Every value has a documented default. A missing or invalid value never
//! fails startup: it is replaced by its default and a warning is logged.

mod duration;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::{AsRefStr, Display, EnumString};
use tracing::warn;

use crate::consolidation::ConsolidationConfig;
use crate::error::{KubeMindError, KubeMindResult};
use crate::retrieval::RetrievalConfig;
use crate::traits::{
    DedupStoreConfig, DedupStoreProvider, EmbedderConfig, EmbedderProvider, VectorStoreConfig,
    VectorStoreProvider,
};

pub use duration::parse_duration;

/// Default dedup window.
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(5 * 60);
/// Default resolution buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 100;
/// Default similarity at or above which a new memory counts as a duplicate.
pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.95;
/// Default similarity a past memory needs to be used for enrichment.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.75;
/// Default number of past memories appended to a goal.
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 3;

/// What the incident gate does when the dedup store is unreachable.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GateFailurePolicy {
    /// Treat the incident as new and keep going.
    #[default]
    FailOpen,
    /// Return the store error to the caller.
    FailClosed,
}

/// Embedder provider configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedderProviderConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: EmbedderProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: EmbedderConfig,
}

/// Main kubemind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeMindConfig {
    /// Dedup window, e.g. `00:05:00`, `300`, `5m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_window: Option<String>,
    /// Gate behaviour on dedup store failure.
    pub gate_failure_policy: GateFailurePolicy,
    /// Resolution buffer capacity.
    pub buffer_capacity: usize,
    /// Similarity at or above which consolidation skips a resolution.
    pub duplicate_threshold: f32,
    /// Minimum similarity for a past memory to enrich a goal.
    pub relevance_threshold: f32,
    /// Maximum number of past memories appended to a goal.
    pub retrieval_limit: usize,
    /// Cluster id recorded on resolutions built by the pipeline.
    pub cluster_id: String,
    /// Mask secrets in logs and resolutions before they are persisted.
    pub redact_persisted_logs: bool,
    /// Embedding provider.
    pub embedder: EmbedderProviderConfig,
    /// Vector store holding the memory collection.
    pub vector_store: VectorStoreConfig,
    /// Dedup store backing the incident gate.
    pub dedup_store: DedupStoreConfig,
}

impl Default for KubeMindConfig {
    fn default() -> Self {
        Self {
            dedup_window: None,
            gate_failure_policy: GateFailurePolicy::default(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
            cluster_id: "default".to_string(),
            redact_persisted_logs: true,
            embedder: EmbedderProviderConfig::default(),
            vector_store: VectorStoreConfig::default(),
            dedup_store: DedupStoreConfig::default(),
        }
    }
}

impl KubeMindConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> KubeMindResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| KubeMindError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| KubeMindError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| KubeMindError::Configuration(e.to_string())),
            _ => Err(KubeMindError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Default location of the config file: `~/.kubemind/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".kubemind"))
            .unwrap_or_else(|| PathBuf::from(".kubemind"))
            .join("config.toml")
    }

    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `KUBEMIND_*` environment variables onto this configuration.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(window) = var("KUBEMIND_DEDUP_WINDOW") {
            self.dedup_window = Some(window);
        }
        if let Some(policy) = var("KUBEMIND_GATE_FAILURE_POLICY") {
            match policy.parse() {
                Ok(policy) => self.gate_failure_policy = policy,
                Err(_) => warn!(value = %policy, "Unknown KUBEMIND_GATE_FAILURE_POLICY, keeping {}", self.gate_failure_policy),
            }
        }
        parse_var(&var, "KUBEMIND_BUFFER_CAPACITY", &mut self.buffer_capacity);
        parse_var(&var, "KUBEMIND_DUPLICATE_THRESHOLD", &mut self.duplicate_threshold);
        parse_var(&var, "KUBEMIND_RELEVANCE_THRESHOLD", &mut self.relevance_threshold);
        parse_var(&var, "KUBEMIND_RETRIEVAL_LIMIT", &mut self.retrieval_limit);
        if let Some(cluster_id) = var("KUBEMIND_CLUSTER_ID") {
            self.cluster_id = cluster_id;
        }

        // Embedder
        if let Some(provider) = var("KUBEMIND_EMBEDDER") {
            match EmbedderProvider::parse(&provider) {
                Some(p) => self.embedder.provider = p,
                None => warn!(value = %provider, "Unknown KUBEMIND_EMBEDDER, keeping {:?}", self.embedder.provider),
            }
        }
        if let Some(model) = var("KUBEMIND_EMBEDDING_MODEL") {
            self.embedder.config.model = model;
        }
        if let Some(api_key) = var("OPENAI_API_KEY") {
            if self.embedder.provider == EmbedderProvider::OpenAI {
                self.embedder.config.api_key = Some(api_key);
            }
        }
        if let Some(base_url) = var("KUBEMIND_EMBEDDER_URL") {
            self.embedder.config.base_url = Some(base_url);
        }

        // Vector store
        if let Some(collection) = var("KUBEMIND_COLLECTION") {
            self.vector_store.collection_name = collection;
        }
        let mut dims = self.vector_store.embedding_model_dims;
        parse_var(&var, "KUBEMIND_EMBEDDING_DIMS", &mut dims);
        self.vector_store.embedding_model_dims = dims;
        self.embedder.config.embedding_dims = dims;
        if let Some(provider) = var("KUBEMIND_VECTOR_STORE") {
            self.vector_store.provider = match provider.to_lowercase().as_str() {
                "memory" => VectorStoreProvider::Memory,
                _ => VectorStoreProvider::Qdrant,
            };
        }
        if let Some(url) = var("KUBEMIND_QDRANT_URL") {
            set_json_field(&mut self.vector_store.config, "url", url);
        }
        if let Some(key) = var("KUBEMIND_QDRANT_API_KEY") {
            set_json_field(&mut self.vector_store.config, "api_key", key);
        }

        // Dedup store
        if let Some(provider) = var("KUBEMIND_DEDUP_STORE") {
            self.dedup_store.provider = match provider.to_lowercase().as_str() {
                "memory" => DedupStoreProvider::Memory,
                _ => DedupStoreProvider::Redis,
            };
        }
        if let Some(url) = var("KUBEMIND_REDIS_URL") {
            self.dedup_store.url = Some(url);
        }
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> KubeMindConfigBuilder {
        KubeMindConfigBuilder::default()
    }

    /// Validate this configuration into the values the pipeline runs with.
    ///
    /// Every fallback is logged here, once. Call it a single time at startup
    /// and pass the result around.
    pub fn settings(&self) -> Settings {
        let embedding_dims = self.resolve_embedding_dims();
        Settings {
            dedup_window: self.resolve_dedup_window(),
            gate_failure_policy: self.gate_failure_policy,
            buffer_capacity: self.resolve_buffer_capacity(),
            embedding_dims,
            cluster_id: self.cluster_id.clone(),
            consolidation: ConsolidationConfig {
                duplicate_threshold: threshold(
                    "duplicate_threshold",
                    self.duplicate_threshold,
                    DEFAULT_DUPLICATE_THRESHOLD,
                ),
                embedding_dims,
                redact_persisted_logs: self.redact_persisted_logs,
            },
            retrieval: RetrievalConfig {
                relevance_threshold: threshold(
                    "relevance_threshold",
                    self.relevance_threshold,
                    DEFAULT_RELEVANCE_THRESHOLD,
                ),
                limit: self.resolve_retrieval_limit(),
                embedding_dims,
            },
        }
    }

    fn resolve_dedup_window(&self) -> Duration {
        let Some(raw) = self.dedup_window.as_deref() else {
            warn!(
                default_minutes = DEFAULT_DEDUP_WINDOW.as_secs() / 60,
                "Dedup window not configured, using default"
            );
            return DEFAULT_DEDUP_WINDOW;
        };
        parse_duration(raw).unwrap_or_else(|| {
            warn!(
                value = %raw,
                default_minutes = DEFAULT_DEDUP_WINDOW.as_secs() / 60,
                "Dedup window is invalid, using default"
            );
            DEFAULT_DEDUP_WINDOW
        })
    }

    fn resolve_buffer_capacity(&self) -> usize {
        if self.buffer_capacity == 0 {
            warn!(
                default = DEFAULT_BUFFER_CAPACITY,
                "Buffer capacity must be positive, using default"
            );
            return DEFAULT_BUFFER_CAPACITY;
        }
        self.buffer_capacity
    }

    // The collection dimension wins over the embedder's.
    fn resolve_embedding_dims(&self) -> usize {
        if self.embedder.config.embedding_dims != self.vector_store.embedding_model_dims {
            warn!(
                embedder_dims = self.embedder.config.embedding_dims,
                collection_dims = self.vector_store.embedding_model_dims,
                "Embedder and collection dimensions differ, the collection dimension wins"
            );
        }
        self.vector_store.embedding_model_dims
    }

    fn resolve_retrieval_limit(&self) -> usize {
        if self.retrieval_limit == 0 {
            warn!(
                default = DEFAULT_RETRIEVAL_LIMIT,
                "Retrieval limit must be positive, using default"
            );
            return DEFAULT_RETRIEVAL_LIMIT;
        }
        self.retrieval_limit
    }
}

/// Validated values derived from a [`KubeMindConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// How long an incident id suppresses repeats.
    pub dedup_window: Duration,
    /// Gate behaviour on dedup store failure.
    pub gate_failure_policy: GateFailurePolicy,
    /// Resolution buffer capacity, always positive.
    pub buffer_capacity: usize,
    /// Embedding dimension D shared by the embedder and the collection.
    pub embedding_dims: usize,
    /// Cluster id recorded on resolutions built by the pipeline.
    pub cluster_id: String,
    /// Memory consolidator settings.
    pub consolidation: ConsolidationConfig,
    /// Memory retriever settings.
    pub retrieval: RetrievalConfig,
}

fn threshold(name: &str, value: f32, default: f32) -> f32 {
    if value.is_nan() {
        warn!(setting = name, default, "Threshold is not a number, using default");
        return default;
    }
    if !(0.0..=1.0).contains(&value) {
        let clamped = value.clamp(0.0, 1.0);
        warn!(setting = name, value, clamped, "Threshold out of range, clamping");
        return clamped;
    }
    value
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = var(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(variable = key, value = %raw, "Ignoring unparsable environment variable"),
        }
    }
}

fn set_json_field(config: &mut serde_json::Value, key: &str, value: String) {
    if !config.is_object() {
        *config = serde_json::json!({});
    }
    if let Some(map) = config.as_object_mut() {
        map.insert(key.to_string(), serde_json::Value::String(value));
    }
}

/// Builder for KubeMindConfig.
#[derive(Default)]
pub struct KubeMindConfigBuilder {
    config: KubeMindConfig,
}

impl KubeMindConfigBuilder {
    /// Set the dedup window.
    pub fn dedup_window(mut self, window: impl Into<String>) -> Self {
        self.config.dedup_window = Some(window.into());
        self
    }

    /// Set the gate failure policy.
    pub fn gate_failure_policy(mut self, policy: GateFailurePolicy) -> Self {
        self.config.gate_failure_policy = policy;
        self
    }

    /// Set the buffer capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Set the duplicate threshold.
    pub fn duplicate_threshold(mut self, threshold: f32) -> Self {
        self.config.duplicate_threshold = threshold;
        self
    }

    /// Set the relevance threshold.
    pub fn relevance_threshold(mut self, threshold: f32) -> Self {
        self.config.relevance_threshold = threshold;
        self
    }

    /// Set the retrieval limit.
    pub fn retrieval_limit(mut self, limit: usize) -> Self {
        self.config.retrieval_limit = limit;
        self
    }

    /// Set the cluster id.
    pub fn cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.config.cluster_id = cluster_id.into();
        self
    }

    /// Set the embedding dimension for both embedder and collection.
    pub fn embedding_dims(mut self, dims: usize) -> Self {
        self.config.embedder.config.embedding_dims = dims;
        self.config.vector_store.embedding_model_dims = dims;
        self
    }

    /// Set embedder configuration.
    pub fn embedder(mut self, provider: EmbedderProvider, config: EmbedderConfig) -> Self {
        self.config.embedder = EmbedderProviderConfig { provider, config };
        self
    }

    /// Set vector store configuration.
    pub fn vector_store(mut self, config: VectorStoreConfig) -> Self {
        self.config.vector_store = config;
        self
    }

    /// Set dedup store configuration.
    pub fn dedup_store(mut self, config: DedupStoreConfig) -> Self {
        self.config.dedup_store = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> KubeMindConfig {
        self.config
    }
}
