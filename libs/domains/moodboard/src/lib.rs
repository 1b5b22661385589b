//! Moodboard domain: index image items as text embeddings, search them by
//! free text, and blend several items into a centroid query.
//!
//! ```text
//! ┌──────────────────┐
//! │ MoodboardService │  ← document template, id strategy, centroid
//! └────────┬─────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │  VectorStore    │     │ EmbeddingProvider │
//! │   (trait)       │     │    (trait)        │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//! ┌────────▼────────┐     ┌────────▼─────────┐
//! │ QdrantStore     │     │  OpenAIProvider   │
//! │ MemoryStore     │     └──────────────────┘
//! └─────────────────┘
//! ```

pub mod blend;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod service;
pub mod store;

pub use config::MoodboardConfig;
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{MoodboardError, MoodboardResult};
pub use handlers::ApiDoc;
pub use ids::IdStrategy;
pub use models::*;
pub use service::MoodboardService;
pub use store::{
    MemoryStore, Metadata, QdrantConfig, QdrantStore, QueryResult, StoredRecord, UpsertRecord,
    VectorStore,
};
