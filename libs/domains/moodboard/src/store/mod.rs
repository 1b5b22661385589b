//! Vector store gateway.
//!
//! The service talks to storage only through [`VectorStore`]. [`QdrantStore`]
//! is the persistent backend; [`MemoryStore`] keeps a collection in process.

mod memory;
mod qdrant;

pub use memory::MemoryStore;
pub use qdrant::{QdrantConfig, QdrantStore};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MoodboardResult;

/// Free-form metadata stored next to each vector.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A record to insert or overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: Metadata,
}

/// Nearest-neighbor hits in ranking order, returned column by column.
///
/// Columns are expected to have equal length. `ids` may come back shorter
/// than `documents`; callers fill the gap with positional placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub ids: Vec<String>,
    pub documents: Vec<Option<String>>,
    pub metadatas: Vec<Option<Metadata>>,
    pub distances: Vec<f32>,
}

impl QueryResult {
    pub fn push(&mut self, id: String, document: Option<String>, metadata: Option<Metadata>, distance: f32) {
        self.ids.push(id);
        self.documents.push(document);
        self.metadatas.push(metadata);
        self.distances.push(distance);
    }
}

/// A record as read back by id or by peeking.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub embedding: Option<Vec<f32>>,
    pub document: Option<String>,
    pub metadata: Option<Metadata>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection this handle operates on
    fn collection(&self) -> String;

    /// Short backend identifier used in readiness output
    fn backend(&self) -> &'static str;

    /// Create the collection if it does not exist yet
    async fn ensure_collection(&self) -> MoodboardResult<()>;

    /// Insert or overwrite records by id
    async fn upsert(&self, records: Vec<UpsertRecord>) -> MoodboardResult<()>;

    /// Up to `k` nearest neighbors of `embedding`, closest first
    async fn query(&self, embedding: Vec<f32>, k: usize) -> MoodboardResult<QueryResult>;

    /// Records for exactly these ids, embeddings included. Unknown ids are skipped.
    async fn get(&self, ids: Vec<String>) -> MoodboardResult<Vec<StoredRecord>>;

    /// Up to `limit` records in storage order
    async fn peek(&self, limit: usize) -> MoodboardResult<Vec<StoredRecord>>;
}
