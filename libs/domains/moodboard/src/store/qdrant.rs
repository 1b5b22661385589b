use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse};
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    RetrievedPoint, ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use tracing::info;
use uuid::Uuid;

use super::{Metadata, QueryResult, StoredRecord, UpsertRecord, VectorStore};
use crate::error::{MoodboardError, MoodboardResult};

/// Payload key holding the caller-visible item id.
const ITEM_ID_KEY: &str = "item_id";
/// Payload key holding the stored document.
const DOCUMENT_KEY: &str = "document";

pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QDRANT_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", DEFAULT_QDRANT_URL),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse("QDRANT_TIMEOUT_SECS", 30)?,
        })
    }
}

/// Remote Qdrant collection using Euclidean distance.
///
/// Qdrant point ids must be integers or UUIDs, so each item id is mapped to a
/// UUIDv5 and the original id is kept in the payload.
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
    dimension: u64,
}

impl QdrantStore {
    pub fn new(config: QdrantConfig, collection: impl Into<String>, dimension: u32) -> MoodboardResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| MoodboardError::Store(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            collection: collection.into(),
            dimension: u64::from(dimension),
        })
    }

    fn point_id(item_id: &str) -> PointId {
        PointId::from(point_uuid(item_id).to_string())
    }

    fn to_payload(record: UpsertRecord) -> HashMap<String, QdrantValue> {
        let mut payload: HashMap<String, QdrantValue> = record
            .metadata
            .into_iter()
            .filter_map(|(k, v)| json_to_qdrant_value(v).map(|v| (k, v)))
            .collect();
        payload.insert(ITEM_ID_KEY.to_string(), QdrantValue::from(record.id));
        payload.insert(DOCUMENT_KEY.to_string(), QdrantValue::from(record.document));
        payload
    }

    /// Split a point payload into (item id, document, remaining metadata).
    fn from_payload(
        payload: HashMap<String, QdrantValue>,
    ) -> (Option<String>, Option<String>, Option<Metadata>) {
        let mut metadata = Metadata::new();
        let mut item_id = None;
        let mut document = None;

        for (key, value) in payload {
            let Some(json) = qdrant_value_to_json(value) else {
                continue;
            };
            match key.as_str() {
                ITEM_ID_KEY => item_id = json.as_str().map(str::to_string),
                DOCUMENT_KEY => document = json.as_str().map(str::to_string),
                _ => {
                    metadata.insert(key, json);
                }
            }
        }

        let metadata = (!metadata.is_empty()).then_some(metadata);
        (item_id, document, metadata)
    }

    fn to_stored(point: RetrievedPoint, with_embedding: bool) -> MoodboardResult<StoredRecord> {
        let (item_id, document, metadata) = Self::from_payload(point.payload);
        let id = item_id
            .or_else(|| point.id.as_ref().and_then(point_id_to_string))
            .ok_or_else(|| MoodboardError::Store("point without id".to_string()))?;

        Ok(StoredRecord {
            id,
            embedding: if with_embedding {
                extract_vector_from_output(&point.vectors)
            } else {
                None
            },
            document,
            metadata,
        })
    }
}

/// Stable UUID for an arbitrary item id.
pub(crate) fn point_uuid(item_id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, item_id.as_bytes())
}

fn point_id_to_string(point_id: &PointId) -> Option<String> {
    match &point_id.point_id_options {
        Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => Some(uuid.clone()),
        Some(qdrant::point_id::PointIdOptions::Num(num)) => Some(num.to_string()),
        None => None,
    }
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(QdrantValue::from(i))
            } else {
                n.as_f64().map(QdrantValue::from)
            }
        }
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        serde_json::Value::Array(values) => Some(QdrantValue {
            kind: Some(qdrant::value::Kind::ListValue(qdrant::ListValue {
                values: values.into_iter().filter_map(json_to_qdrant_value).collect(),
            })),
        }),
        serde_json::Value::Object(_) => Some(QdrantValue::from(val.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f).map(serde_json::Value::Number),
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        Some(Kind::ListValue(list)) => Some(serde_json::Value::Array(
            list.values.into_iter().filter_map(qdrant_value_to_json).collect(),
        )),
        _ => None,
    }
}

/// Uses the deprecated `data` field until the client exposes dense vectors directly.
#[allow(deprecated)]
fn extract_vector_from_output(vectors: &Option<qdrant::VectorsOutput>) -> Option<Vec<f32>> {
    match vectors {
        Some(qdrant::VectorsOutput {
            vectors_options: Some(opts),
        }) => match opts {
            qdrant::vectors_output::VectorsOptions::Vector(v) => Some(v.data.clone()),
            qdrant::vectors_output::VectorsOptions::Vectors(map) => {
                map.vectors.values().next().map(|v| v.data.clone())
            }
        },
        _ => None,
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn collection(&self) -> String {
        self.collection.clone()
    }

    fn backend(&self) -> &'static str {
        "qdrant"
    }

    async fn ensure_collection(&self) -> MoodboardResult<()> {
        if self.client.collection_exists(&self.collection).await? {
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension, Distance::Euclid),
                ),
            )
            .await?;

        info!(collection = %self.collection, dimension = self.dimension, "created qdrant collection");
        Ok(())
    }

    async fn upsert(&self, records: Vec<UpsertRecord>) -> MoodboardResult<()> {
        let points: Vec<PointStruct> = records
            .into_iter()
            .map(|record| {
                let id = Self::point_id(&record.id);
                let vector = record.embedding.clone();
                PointStruct::new(id, vector, Self::to_payload(record))
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        Ok(())
    }

    async fn query(&self, embedding: Vec<f32>, k: usize) -> MoodboardResult<QueryResult> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding, k as u64).with_payload(true),
            )
            .await?;

        let mut result = QueryResult::default();
        for point in response.result {
            let (item_id, document, metadata) = Self::from_payload(point.payload);
            let id = item_id
                .or_else(|| point.id.as_ref().and_then(point_id_to_string))
                .ok_or_else(|| MoodboardError::Store("point without id".to_string()))?;

            // For Euclid collections Qdrant reports the distance as the score.
            result.push(id, document, metadata, point.score);
        }

        Ok(result)
    }

    async fn get(&self, ids: Vec<String>) -> MoodboardResult<Vec<StoredRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::point_id(id)).collect();

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, point_ids)
                    .with_vectors(true)
                    .with_payload(true),
            )
            .await?;

        response
            .result
            .into_iter()
            .map(|point| Self::to_stored(point, true))
            .collect()
    }

    async fn peek(&self, limit: usize) -> MoodboardResult<Vec<StoredRecord>> {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);

        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection)
                    .limit(limit)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await?;

        response
            .result
            .into_iter()
            .map(|point| Self::to_stored(point, false))
            .collect()
    }
}
