//! Application state management.
//!
//! The state holds the configuration and the moodboard service. The service
//! owns the store and embedding handles behind `Arc`, so cloning is cheap.

use std::sync::Arc;

use domain_moodboard::{
    EmbeddingProvider, MoodboardConfig, MoodboardService, OpenAIProvider, QdrantStore, VectorStore,
};
use tracing::info;

use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub service: MoodboardService,
}

impl AppState {
    /// Build the store and embedding handles once for the process lifetime.
    pub async fn build(config: Config) -> eyre::Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAIProvider::new(config.openai.clone()));
        let store = connect_store(&config.moodboard, embedder.model().dimension()).await?;

        let service = MoodboardService::new(store, embedder)
            .with_id_strategy(config.moodboard.id_strategy)
            .with_blend_overfetch(config.moodboard.blend_overfetch);

        Ok(Self { config, service })
    }
}

/// Connect to Qdrant and make sure the collection exists before serving.
async fn connect_store(config: &MoodboardConfig, dimension: u32) -> eyre::Result<Arc<dyn VectorStore>> {
    info!(url = %config.qdrant.url, collection = %config.collection, "Using Qdrant vector store");
    let store: Arc<dyn VectorStore> =
        Arc::new(QdrantStore::new(config.qdrant.clone(), config.collection.clone(), dimension)?);

    store.ensure_collection().await?;
    Ok(store)
}
