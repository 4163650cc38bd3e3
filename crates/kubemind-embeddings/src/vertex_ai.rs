//! Vertex AI embedding provider, via the REST predict endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kubemind_core::error::{KubeMindError, KubeMindResult};
use kubemind_core::traits::{Embedder, EmbedderConfig};

/// Default Vertex AI region.
pub(crate) const DEFAULT_LOCATION: &str = "us-central1";
/// Default Vertex AI embedding model.
pub(crate) const DEFAULT_MODEL: &str = "text-embedding-004";

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Instance<'a> {
    content: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    output_dimensionality: usize,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: PredictionEmbeddings,
}

#[derive(Deserialize)]
struct PredictionEmbeddings {
    values: Vec<f32>,
}

/// Vertex AI text embedding provider.
///
/// Authenticates with a bearer access token, taken from `api_key` in the
/// config or the `GOOGLE_ACCESS_TOKEN` environment variable.
pub struct VertexAIEmbedder {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    config: EmbedderConfig,
}

impl VertexAIEmbedder {
    /// Create a new Vertex AI embedder.
    pub fn new(config: EmbedderConfig) -> KubeMindResult<Self> {
        let project_id = config
            .project_id
            .clone()
            .or_else(|| std::env::var("GCP_PROJECT_ID").ok())
            .or_else(|| std::env::var("GOOGLE_CLOUD_PROJECT").ok())
            .ok_or_else(|| {
                KubeMindError::Configuration(
                    "Vertex AI project not found. Set GCP_PROJECT_ID or provide project_id in config."
                        .to_string(),
                )
            })?;

        let token = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_ACCESS_TOKEN").ok())
            .ok_or_else(|| {
                KubeMindError::Configuration(
                    "Vertex AI access token not found. Set GOOGLE_ACCESS_TOKEN or provide api_key in config."
                        .to_string(),
                )
            })?;

        let location = config.location.as_deref().unwrap_or(DEFAULT_LOCATION);
        let endpoint = match config.base_url {
            Some(ref base_url) => format!(
                "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
                base_url.trim_end_matches('/'),
                project_id,
                location,
                config.model
            ),
            None => format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{}:predict",
                config.model
            ),
        };

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
            config,
        })
    }

    /// Predict endpoint used for requests.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for VertexAIEmbedder {
    async fn embed(&self, text: &str) -> KubeMindResult<Vec<f32>> {
        let body = PredictRequest {
            instances: vec![Instance { content: text }],
            parameters: Parameters {
                output_dimensionality: self.config.embedding_dims,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| KubeMindError::api(format!("Vertex AI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(KubeMindError::embedding(format!(
                "Vertex AI embedding error ({}): {}",
                status, detail
            )));
        }

        let parsed: PredictResponse = response
            .json()
            .await
            .map_err(|e| KubeMindError::embedding(format!("Invalid Vertex AI response: {}", e)))?;

        let values = parsed
            .predictions
            .into_iter()
            .next()
            .map(|p| p.embeddings.values)
            .ok_or_else(|| KubeMindError::embedding("No embedding returned"))?;

        debug!(model = %self.config.model, dims = values.len(), "Vertex AI embedding generated");
        Ok(values)
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

    fn config() -> EmbedderConfig {
        EmbedderConfig {
            model: DEFAULT_MODEL.to_string(),
            project_id: Some("kubemind-prod".to_string()),
            api_key: Some("ya29.token".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_endpoint() {
        let embedder = VertexAIEmbedder::new(config()).unwrap();
        assert_eq!(
            embedder.endpoint(),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/kubemind-prod/locations/us-central1/publishers/google/models/text-embedding-004:predict"
        );
    }

    #[test]
    fn test_custom_base_url_and_location() {
        let embedder = VertexAIEmbedder::new(EmbedderConfig {
            base_url: Some("http://localhost:8080/".to_string()),
            location: Some("europe-west4".to_string()),
            ..config()
        })
        .unwrap();
        assert_eq!(
            embedder.endpoint(),
            "http://localhost:8080/v1/projects/kubemind-prod/locations/europe-west4/publishers/google/models/text-embedding-004:predict"
        );
    }

    #[test]
    fn test_request_wire_format() {
        let body = PredictRequest {
            instances: vec![Instance { content: "oom killed" }],
            parameters: Parameters {
                output_dimensionality: 768,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "instances": [{"content": "oom killed"}],
                "parameters": {"outputDimensionality": 768}
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: PredictResponse = serde_json::from_str(
            r#"{"predictions":[{"embeddings":{"statistics":{"token_count":3},"values":[0.1,0.2,0.3]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.predictions[0].embeddings.values, vec![0.1, 0.2, 0.3]);
    }
}
