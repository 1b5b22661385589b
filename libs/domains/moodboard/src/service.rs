use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::blend::{centroid, exclude_and_truncate};
use crate::document::{
    caption_from_document, compose_document, image_url_from, metadata_for, recover_tags,
    score_from_distance,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{MoodboardError, MoodboardResult};
use crate::ids::IdStrategy;
use crate::models::{
    HealthResponse, IndexResponse, ItemIn, ListResponse, ListedItem, SearchResponse,
    SearchResponseItem,
};
use crate::store::{QueryResult, UpsertRecord, VectorStore};

/// Orchestrates the embedding provider and the vector store.
#[derive(Clone)]
pub struct MoodboardService {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    id_strategy: IdStrategy,
    blend_overfetch: bool,
}

impl MoodboardService {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            id_strategy: IdStrategy::default(),
            blend_overfetch: true,
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// When enabled, blend asks the store for one extra candidate per distinct
    /// input id (`k + ids`) so that excluding the inputs still leaves `k` results.
    pub fn with_blend_overfetch(mut self, enabled: bool) -> Self {
        self.blend_overfetch = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Touch the store once and report the collection in use.
    #[instrument(skip(self))]
    pub async fn health(&self) -> MoodboardResult<HealthResponse> {
        self.store.ensure_collection().await?;
        Ok(HealthResponse {
            status: "ok".to_string(),
            chroma_collection: self.store.collection(),
        })
    }

    /// Embed and upsert a batch of items. Returns the number submitted.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn index_items(&self, items: Vec<ItemIn>) -> MoodboardResult<IndexResponse> {
        if items.is_empty() {
            return Ok(IndexResponse { added: 0 });
        }

        let documents: Vec<String> = items
            .iter()
            .map(|item| compose_document(&item.caption, &item.tags))
            .collect();

        let embeddings = self.embedder.embed_batch(&documents).await?;
        if embeddings.len() != items.len() {
            return Err(MoodboardError::Embedding(format!(
                "expected {} embeddings, provider returned {}",
                items.len(),
                embeddings.len()
            )));
        }
        let tokens_used: u32 = embeddings.iter().map(|e| e.tokens_used).sum();
        debug!(tokens_used, "embedded documents");

        let records: Vec<UpsertRecord> = items
            .into_iter()
            .zip(documents)
            .zip(embeddings)
            .map(|((item, document), embedding)| UpsertRecord {
                id: item
                    .id
                    .unwrap_or_else(|| self.id_strategy.derive(&document)),
                metadata: metadata_for(&item.image_url, &item.tags),
                embedding: embedding.values,
                document,
            })
            .collect();

        let added = records.len();
        self.store.upsert(records).await?;

        info!(added, collection = %self.store.collection(), "indexed items");
        Ok(IndexResponse { added })
    }

    /// Nearest neighbors of the embedded query text.
    #[instrument(skip(self))]
    pub async fn search(&self, q: &str, k: usize) -> MoodboardResult<SearchResponse> {
        ensure_positive("k", k)?;

        let embedding = self.embedder.embed(q).await?;
        let result = self.store.query(embedding.values, k).await?;

        Ok(SearchResponse {
            items: map_hits(result),
        })
    }

    /// Nearest neighbors of the centroid of the given items, excluding those items.
    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    pub async fn blend(&self, ids: Vec<String>, k: usize) -> MoodboardResult<SearchResponse> {
        ensure_positive("k", k)?;
        if ids.is_empty() {
            return Err(MoodboardError::Validation(
                "at least one id is required".to_string(),
            ));
        }

        let mut excluded = HashSet::with_capacity(ids.len());
        let distinct: Vec<String> = ids
            .into_iter()
            .filter(|id| excluded.insert(id.clone()))
            .collect();

        let vectors: Vec<Vec<f32>> = self
            .store
            .get(distinct)
            .await?
            .into_iter()
            .filter_map(|record| record.embedding)
            .collect();

        if vectors.is_empty() {
            return Err(MoodboardError::NotFound(
                "No items found for the given ids".to_string(),
            ));
        }

        let center = centroid(&vectors)?;
        let fetch = if self.blend_overfetch {
            k.saturating_add(excluded.len())
        } else {
            k
        };

        debug!(resolved = vectors.len(), fetch, "querying blend centroid");
        let result = self.store.query(center, fetch).await?;

        Ok(SearchResponse {
            items: exclude_and_truncate(map_hits(result), &excluded, k),
        })
    }

    /// First `n` items in storage order.
    #[instrument(skip(self))]
    pub async fn list_items(&self, n: usize) -> MoodboardResult<ListResponse> {
        ensure_positive("n", n)?;

        let items = self
            .store
            .peek(n)
            .await?
            .into_iter()
            .map(|record| ListedItem {
                image_url: image_url_from(record.metadata.as_ref()),
                caption: caption_from_document(record.document.as_deref().unwrap_or_default()),
                id: record.id,
            })
            .collect();

        Ok(ListResponse { items })
    }
}

fn ensure_positive(name: &str, value: usize) -> MoodboardResult<()> {
    if value == 0 {
        return Err(MoodboardError::Validation(format!(
            "{} must be at least 1",
            name
        )));
    }
    Ok(())
}

/// Convert store hits into response items, keeping the store's ranking.
fn map_hits(result: QueryResult) -> Vec<SearchResponseItem> {
    let QueryResult {
        ids,
        documents,
        metadatas,
        distances,
    } = result;

    documents
        .into_iter()
        .zip(metadatas)
        .zip(distances)
        .enumerate()
        .map(|(i, ((document, metadata), distance))| SearchResponseItem {
            id: ids
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("result-{}", i)),
            image_url: image_url_from(metadata.as_ref()),
            caption: caption_from_document(document.as_deref().unwrap_or_default()),
            tags: recover_tags(metadata.as_ref()),
            score: score_from_distance(distance),
        })
        .collect()
}
