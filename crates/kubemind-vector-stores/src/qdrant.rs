//! Qdrant vector store implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use kubemind_core::error::{ErrorCode, KubeMindError, KubeMindResult};
use kubemind_core::traits::{
    DistanceMetric, VectorRecord, VectorSearchResult, VectorStore, VectorStoreConfig,
};

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;

/// Payload key holding the caller's record id.
pub(crate) const RECORD_ID_KEY: &str = "record_id";

/// Namespace for deriving point ids from record ids that are not UUIDs.
const POINT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b75_6265_6d69_6e64_8000_0000_0000_0001);

/// Qdrant vector store implementation.
///
/// Qdrant only accepts unsigned integers and UUIDs as point ids. Incident ids
/// such as `INC-42` are mapped to a stable UUIDv5 and the original id is kept
/// in the payload under `record_id`.
pub struct QdrantVectorStore {
    client: Qdrant,
    config: VectorStoreConfig,
}

impl QdrantVectorStore {
    /// Create a new Qdrant vector store.
    pub async fn new(config: VectorStoreConfig) -> KubeMindResult<Self> {
        let url = config
            .config
            .get("url")
            .and_then(|v| v.as_str())
            .unwrap_or("http://localhost:6334");

        let api_key = config.config.get("api_key").and_then(|v| v.as_str());

        let mut builder = Qdrant::from_url(url);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(|e| KubeMindError::VectorStore {
            message: format!("Failed to create Qdrant client: {}", e),
            code: ErrorCode::VecConnectionFailed,
            source: None,
        })?;

        debug!(url, collection = %config.collection_name, "Qdrant client created");
        Ok(Self { client, config })
    }

    /// Point id used for a record id.
    pub(crate) fn point_id(id: &str) -> String {
        match Uuid::parse_str(id) {
            Ok(uuid) => uuid.to_string(),
            Err(_) => Uuid::new_v5(&POINT_ID_NAMESPACE, id.as_bytes()).to_string(),
        }
    }

    fn distance_to_qdrant(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
        }
    }

    /// Convert a point payload, returning the record id stored in it if any.
    fn split_payload(
        payload: HashMap<String, Value>,
    ) -> (Option<String>, HashMap<String, serde_json::Value>) {
        let mut converted: HashMap<String, serde_json::Value> = payload
            .into_iter()
            .map(|(k, v)| (k, Self::qdrant_value_to_json(v)))
            .collect();

        let record_id = match converted.remove(RECORD_ID_KEY) {
            Some(serde_json::Value::String(id)) => Some(id),
            _ => None,
        };
        (record_id, converted)
    }

    fn qdrant_value_to_json(value: Value) -> serde_json::Value {
        use qdrant_client::qdrant::value::Kind;
        match value.kind {
            Some(Kind::NullValue(_)) => serde_json::Value::Null,
            Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
            Some(Kind::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Some(Kind::StringValue(s)) => serde_json::Value::String(s),
            Some(Kind::ListValue(list)) => serde_json::Value::Array(
                list.values
                    .into_iter()
                    .map(Self::qdrant_value_to_json)
                    .collect(),
            ),
            Some(Kind::StructValue(s)) => serde_json::Value::Object(
                s.fields
                    .into_iter()
                    .map(|(k, v)| (k, Self::qdrant_value_to_json(v)))
                    .collect(),
            ),
            None => serde_json::Value::Null,
        }
    }

    fn json_to_qdrant_value(value: serde_json::Value) -> Value {
        use qdrant_client::qdrant::value::Kind;
        use qdrant_client::qdrant::{ListValue, Struct};

        let kind = match value {
            serde_json::Value::Null => Kind::NullValue(0),
            serde_json::Value::Bool(b) => Kind::BoolValue(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Kind::IntegerValue(i)
                } else if let Some(f) = n.as_f64() {
                    Kind::DoubleValue(f)
                } else {
                    Kind::NullValue(0)
                }
            }
            serde_json::Value::String(s) => Kind::StringValue(s),
            serde_json::Value::Array(arr) => Kind::ListValue(ListValue {
                values: arr.into_iter().map(Self::json_to_qdrant_value).collect(),
            }),
            serde_json::Value::Object(obj) => Kind::StructValue(Struct {
                fields: obj
                    .into_iter()
                    .map(|(k, v)| (k, Self::json_to_qdrant_value(v)))
                    .collect(),
            }),
        };

        Value { kind: Some(kind) }
    }

    fn to_point(record: VectorRecord) -> PointStruct {
        let mut payload: HashMap<String, Value> = record
            .payload
            .into_iter()
            .map(|(k, v)| (k, Self::json_to_qdrant_value(v)))
            .collect();
        let point_id = Self::point_id(&record.id);
        payload.insert(
            RECORD_ID_KEY.to_string(),
            Self::json_to_qdrant_value(serde_json::Value::String(record.id)),
        );

        PointStruct::new(point_id, record.vector, payload)
    }

    fn extract_point_id(point_id: Option<PointId>) -> String {
        match point_id {
            Some(PointId {
                point_id_options:
                    Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
            }) => uuid,
            Some(PointId {
                point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
            }) => num.to_string(),
            _ => String::new(),
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(
        &self,
        name: &str,
        dimension: usize,
        distance: DistanceMetric,
    ) -> KubeMindResult<()> {
        let request = CreateCollectionBuilder::new(name).vectors_config(
            VectorParamsBuilder::new(dimension as u64, Self::distance_to_qdrant(distance)),
        );

        self.client
            .create_collection(request)
            .await
            .map_err(|e| KubeMindError::vector_store(format!("Failed to create collection: {}", e)))?;

        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> KubeMindResult<bool> {
        self.client.collection_exists(name).await.map_err(|e| {
            KubeMindError::vector_store(format!("Failed to check collection: {}", e))
        })
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> KubeMindResult<()> {
        let points: Vec<PointStruct> = records.into_iter().map(Self::to_point).collect();

        let request = UpsertPointsBuilder::new(self.collection_name(), points).wait(true);

        self.client
            .upsert_points(request)
            .await
            .map_err(|e| KubeMindError::vector_store(format!("Failed to upsert vectors: {}", e)))?;

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        min_score: Option<f32>,
    ) -> KubeMindResult<Vec<VectorSearchResult>> {
        let mut request = SearchPointsBuilder::new(
            self.collection_name(),
            query_vector.to_vec(),
            limit as u64,
        )
        .with_payload(true);

        if let Some(threshold) = min_score {
            request = request.score_threshold(threshold);
        }

        let search_result = self
            .client
            .search_points(request)
            .await
            .map_err(|e| KubeMindError::vector_store(format!("Failed to search vectors: {}", e)))?;

        let results = search_result
            .result
            .into_iter()
            .map(|point| {
                let (record_id, payload) = Self::split_payload(point.payload);
                VectorSearchResult {
                    id: record_id.unwrap_or_else(|| Self::extract_point_id(point.id)),
                    score: point.score,
                    payload,
                }
            })
            .collect();

        Ok(results)
    }

    async fn get(&self, id: &str) -> KubeMindResult<Option<VectorRecord>> {
        let point_id: PointId = Self::point_id(id).into();
        let request = GetPointsBuilder::new(self.collection_name(), vec![point_id])
            .with_payload(true)
            .with_vectors(true);

        let result = self
            .client
            .get_points(request)
            .await
            .map_err(|e| KubeMindError::vector_store(format!("Failed to get vector: {}", e)))?;

        let record = result.result.into_iter().next().map(|point| {
            let vector = match point.vectors {
                Some(vectors) => match vectors.vectors_options {
                    Some(
                        qdrant_client::qdrant::vectors_output::VectorsOptions::Vector(v),
                    ) => v.data,
                    _ => vec![],
                },
                None => vec![],
            };
            let (_, payload) = Self::split_payload(point.payload);

            VectorRecord {
                id: id.to_string(),
                vector,
                payload,
            }
        });

        Ok(record)
    }

    fn collection_name(&self) -> &str {
        &self.config.collection_name
    }
}
