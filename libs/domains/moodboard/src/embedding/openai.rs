use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_required};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::EmbeddingProvider;
use crate::error::{MoodboardError, MoodboardResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI embedding provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: EmbeddingModel,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: EmbeddingModel::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

impl FromEnv for OpenAIConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let base_url = env_or_default("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let model = match env_optional("EMBEDDING_MODEL") {
            Some(raw) => raw.parse().map_err(|details| ConfigError::ParseError {
                key: "EMBEDDING_MODEL".to_string(),
                details,
            })?,
            None => EmbeddingModel::default(),
        };

        Ok(Self {
            api_key,
            base_url,
            model,
        })
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn model(&self) -> EmbeddingModel {
        self.config.model
    }

    async fn embed(&self, text: &str) -> MoodboardResult<EmbeddingResult> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| MoodboardError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> MoodboardResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: self.config.model.model_name(),
            input: texts,
        };

        debug!(model = request.model, count = texts.len(), "requesting embeddings");

        let response = self
            .client
            .post(self.config.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MoodboardError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;
        into_results(embedding_response, texts.len())
    }
}

fn into_results(
    response: EmbeddingResponse,
    expected: usize,
) -> MoodboardResult<Vec<EmbeddingResult>> {
    if response.data.len() != expected {
        return Err(MoodboardError::Embedding(format!(
            "expected {} embeddings, provider returned {}",
            expected,
            response.data.len()
        )));
    }

    // Sort by index to maintain order
    let mut data = response.data;
    data.sort_by_key(|d| d.index);

    // Usage is reported per request; spread it so the shares sum to the total.
    let total = response.usage.map(|u| u.total_tokens).unwrap_or_default();
    let count = expected.max(1) as u32;
    let (share, remainder) = (total / count, total % count);

    Ok(data
        .into_iter()
        .enumerate()
        .map(|(i, d)| EmbeddingResult {
            values: d.embedding,
            tokens_used: share + u32::from((i as u32) < remainder),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = OpenAIConfig::new("k".into()).with_base_url("http://localhost:9000/v1/".into());
        assert_eq!(config.endpoint(), "http://localhost:9000/v1/embeddings");
    }

    #[test]
    fn test_request_body_shape() {
        let input = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-3-small",
            input: &input,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "text-embedding-3-small", "input": ["a", "b"]})
        );
    }

    #[test]
    fn test_results_are_reordered_by_index() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [
                {"embedding": [2.0, 2.0], "index": 1},
                {"embedding": [1.0, 1.0], "index": 0}
            ],
            "usage": {"prompt_tokens": 5, "total_tokens": 5}
        }))
        .unwrap();

        let results = into_results(response, 2).unwrap();
        assert_eq!(results[0].values, vec![1.0, 1.0]);
        assert_eq!(results[1].values, vec![2.0, 2.0]);
        assert_eq!(results[0].tokens_used, 3);
        assert_eq!(results[1].tokens_used, 2);
    }

    #[test]
    fn test_count_mismatch_is_an_error() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [{"embedding": [1.0], "index": 0}]
        }))
        .unwrap();

        let err = into_results(response, 2).unwrap_err();
        assert!(matches!(err, MoodboardError::Embedding(_)));
    }

    #[test]
    fn test_missing_usage_counts_zero_tokens() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [{"embedding": [1.0], "index": 0}]
        }))
        .unwrap();

        let results = into_results(response, 1).unwrap();
        assert_eq!(results[0].tokens_used, 0);
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("OPENAI_BASE_URL", Some("http://proxy.local/v1")),
                ("EMBEDDING_MODEL", Some("text-embedding-3-large")),
            ],
            || {
                let config = OpenAIConfig::from_env().unwrap();
                assert_eq!(config.api_key, "sk-test");
                assert_eq!(config.base_url, "http://proxy.local/v1");
                assert_eq!(config.model, EmbeddingModel::TextEmbedding3Large);
            },
        );
    }

    #[test]
    fn test_config_requires_api_key() {
        temp_env::with_var_unset("OPENAI_API_KEY", || {
            assert!(OpenAIConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_config_rejects_unknown_model() {
        temp_env::with_vars(
            [
                ("OPENAI_API_KEY", Some("sk-test")),
                ("EMBEDDING_MODEL", Some("bogus")),
            ],
            || {
                let err = OpenAIConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("EMBEDDING_MODEL"));
            },
        );
    }
}
