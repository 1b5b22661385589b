use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::document::TAGS_MARKER;

pub const DEFAULT_K: usize = 10;
pub const DEFAULT_N: usize = 10;

fn default_k() -> usize {
    DEFAULT_K
}

fn default_n() -> usize {
    DEFAULT_N
}

// ===== Requests =====

/// An item submitted for indexing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ItemIn {
    /// Caller supplied id. Derived from the content when absent.
    #[serde(default)]
    #[validate(length(min = 1, message = "id must not be empty"))]
    pub id: Option<String>,
    #[validate(custom(function = "validate_image_url"))]
    #[schema(example = "https://images.example.com/chair.jpg")]
    pub image_url: String,
    #[validate(custom(function = "validate_caption"))]
    #[schema(example = "red velvet armchair")]
    pub caption: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST /index`: a bare JSON array of items.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(transparent)]
pub struct IndexRequest {
    #[validate(nested)]
    pub items: Vec<ItemIn>,
}

/// Body of `POST /blend`: a bare JSON array of item ids.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(transparent)]
pub struct BlendRequest {
    #[validate(length(min = 1, message = "at least one id is required"))]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free text query
    pub q: String,
    /// Number of results
    #[serde(default = "default_k")]
    #[param(default = 10, minimum = 1)]
    pub k: usize,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlendParams {
    /// Number of results
    #[serde(default = "default_k")]
    #[param(default = 10, minimum = 1)]
    pub k: usize,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Number of items to return
    #[serde(default = "default_n")]
    #[param(default = 10, minimum = 1)]
    pub n: usize,
}

fn validate_image_url(value: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(value).map_err(|_| {
        ValidationError::new("image_url").with_message("image_url must be a valid URL".into())
    })?;

    let scheme_ok = matches!(parsed.scheme(), "http" | "https");
    if !scheme_ok || parsed.host_str().is_none() {
        return Err(ValidationError::new("image_url")
            .with_message("image_url must be an absolute http(s) URL".into()));
    }

    Ok(())
}

fn validate_caption(value: &str) -> Result<(), ValidationError> {
    if value.contains(TAGS_MARKER) {
        return Err(ValidationError::new("caption")
            .with_message("caption must not contain a line starting with 'TAGS:'".into()));
    }
    Ok(())
}

// ===== Responses =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "items")]
    pub chroma_collection: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    pub added: usize,
}

/// A ranked hit from search or blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResponseItem {
    pub id: String,
    pub image_url: String,
    pub caption: String,
    pub tags: Vec<String>,
    /// `1 / (1 + distance)`, higher is closer
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub items: Vec<SearchResponseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListedItem {
    pub id: String,
    pub image_url: String,
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub items: Vec<ListedItem>,
}

// ===== Embeddings =====

/// Supported embedding models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-3-small (1536 dimensions)
    #[default]
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    /// OpenAI text-embedding-ada-002 (1536 dimensions)
    TextEmbeddingAda002,
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
        }
    }
}

impl FromStr for EmbeddingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            other => Err(format!("unsupported embedding model '{}'", other)),
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Result of an embedding call
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    /// This input's share of the provider-reported usage. Zero when unknown.
    pub tokens_used: u32,
}

impl EmbeddingResult {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            tokens_used: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(image_url: &str, caption: &str) -> ItemIn {
        ItemIn {
            id: None,
            image_url: image_url.to_string(),
            caption: caption.to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn test_item_accepts_http_and_https() {
        assert!(item("https://a.test/x.png", "c").validate().is_ok());
        assert!(item("http://a.test/x.png", "c").validate().is_ok());
    }

    #[test]
    fn test_item_rejects_bad_urls() {
        for url in ["not a url", "ftp://a.test/x.png", "file:///tmp/x.png", ""] {
            assert!(item(url, "c").validate().is_err(), "{url} should be rejected");
        }
    }

    #[test]
    fn test_item_rejects_caption_with_tags_marker() {
        let err = item("https://a.test/x.png", "chair\nTAGS: sneaky")
            .validate()
            .unwrap_err();
        assert!(err.field_errors().contains_key("caption"));
    }

    #[test]
    fn test_item_rejects_empty_id() {
        let mut it = item("https://a.test/x.png", "c");
        it.id = Some(String::new());
        assert!(it.validate().is_err());
    }

    #[test]
    fn test_index_request_is_bare_array() {
        let req: IndexRequest = serde_json::from_value(json!([
            {"image_url": "https://a.test/1.png", "caption": "one"},
            {"id": "two", "image_url": "https://a.test/2.png", "caption": "two", "tags": ["t"]}
        ]))
        .unwrap();
        assert_eq!(req.items.len(), 2);
        assert_eq!(req.items[0].tags, Vec::<String>::new());
        assert_eq!(req.items[1].id.as_deref(), Some("two"));
    }

    #[test]
    fn test_index_request_validates_nested_items() {
        let req = IndexRequest {
            items: vec![item("https://a.test/1.png", "ok"), item("nope", "bad url")],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blend_request_requires_ids() {
        let req: BlendRequest = serde_json::from_value(json!([])).unwrap();
        assert!(req.validate().is_err());

        let req: BlendRequest = serde_json::from_value(json!(["a"])).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_embedding_model_parse() {
        assert_eq!(
            "text-embedding-3-large".parse::<EmbeddingModel>(),
            Ok(EmbeddingModel::TextEmbedding3Large)
        );
        assert!("word2vec".parse::<EmbeddingModel>().is_err());
        assert_eq!(EmbeddingModel::default().dimension(), 1536);
        assert_eq!(EmbeddingModel::TextEmbeddingAda002.to_string(), "text-embedding-ada-002");
    }
}
