use async_trait::async_trait;

use crate::error::MoodboardResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Turns text into a fixed-length vector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model every call is issued against
    fn model(&self) -> EmbeddingModel;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> MoodboardResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts, preserving input order
    async fn embed_batch(&self, texts: &[String]) -> MoodboardResult<Vec<EmbeddingResult>>;
}
