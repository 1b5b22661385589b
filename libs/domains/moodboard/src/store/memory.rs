use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Metadata, QueryResult, StoredRecord, UpsertRecord, VectorStore};
use crate::error::{MoodboardError, MoodboardResult};

#[derive(Debug, Clone)]
struct Record {
    id: String,
    embedding: Vec<f32>,
    document: String,
    metadata: Metadata,
}

impl Record {
    fn to_stored(&self, with_embedding: bool) -> StoredRecord {
        StoredRecord {
            id: self.id.clone(),
            embedding: with_embedding.then(|| self.embedding.clone()),
            document: Some(self.document.clone()),
            metadata: Some(self.metadata.clone()),
        }
    }
}

/// Records in insertion order plus an id index into them.
#[derive(Debug, Default)]
struct State {
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl State {
    fn dimension(&self) -> Option<usize> {
        self.records.first().map(|r| r.embedding.len())
    }

    /// Last write wins; an overwritten record keeps its first position.
    fn put(&mut self, record: Record) {
        match self.index.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}

/// Non-persistent collection with exhaustive squared-L2 search.
///
/// Stands in for a real backend in tests. A batch is checked as a whole
/// before any record is written.
pub struct MemoryStore {
    collection: String,
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            state: RwLock::new(State::default()),
        }
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[async_trait]
impl VectorStore for MemoryStore {
    fn collection(&self) -> String {
        self.collection.clone()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_collection(&self) -> MoodboardResult<()> {
        Ok(())
    }

    async fn upsert(&self, records: Vec<UpsertRecord>) -> MoodboardResult<()> {
        let mut state = self.state.write().await;

        let expected = state
            .dimension()
            .or_else(|| records.first().map(|r| r.embedding.len()));

        if let Some(expected) = expected {
            if let Some(bad) = records.iter().find(|r| r.embedding.len() != expected) {
                return Err(MoodboardError::Store(format!(
                    "embedding for '{}' has dimension {}, collection uses {}",
                    bad.id,
                    bad.embedding.len(),
                    expected
                )));
            }
        }

        for record in records {
            state.put(Record {
                id: record.id,
                embedding: record.embedding,
                document: record.document,
                metadata: record.metadata,
            });
        }

        Ok(())
    }

    async fn query(&self, embedding: Vec<f32>, k: usize) -> MoodboardResult<QueryResult> {
        let state = self.state.read().await;

        if let Some(dim) = state.dimension() {
            if dim != embedding.len() {
                return Err(MoodboardError::Store(format!(
                    "query has dimension {}, collection uses {}",
                    embedding.len(),
                    dim
                )));
            }
        }

        let mut scored: Vec<(f32, &Record)> = state
            .records
            .iter()
            .map(|r| (squared_l2(&embedding, &r.embedding), r))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut result = QueryResult::default();
        for (distance, record) in scored.into_iter().take(k) {
            result.push(
                record.id.clone(),
                Some(record.document.clone()),
                Some(record.metadata.clone()),
                distance,
            );
        }
        Ok(result)
    }

    async fn get(&self, ids: Vec<String>) -> MoodboardResult<Vec<StoredRecord>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.index.get(id))
            .map(|&pos| state.records[pos].to_stored(true))
            .collect())
    }

    async fn peek(&self, limit: usize) -> MoodboardResult<Vec<StoredRecord>> {
        let state = self.state.read().await;
        Ok(state
            .records
            .iter()
            .take(limit)
            .map(|r| r.to_stored(false))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, embedding: Vec<f32>) -> UpsertRecord {
        UpsertRecord {
            id: id.to_string(),
            embedding,
            document: format!("{id}\nTAGS: t"),
            metadata: json!({"image_url": format!("https://x.test/{id}.png"), "tags_csv": "t"})
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    async fn ids(store: &MemoryStore) -> Vec<String> {
        store
            .peek(usize::MAX)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect()
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let store = MemoryStore::new("items");
        store
            .upsert(vec![
                record("far", vec![10.0, 0.0]),
                record("near", vec![1.0, 0.0]),
                record("mid", vec![3.0, 0.0]),
            ])
            .await
            .unwrap();

        let result = store.query(vec![0.0, 0.0], 2).await.unwrap();
        assert_eq!(result.ids, vec!["near", "mid"]);
        assert_eq!(result.distances, vec![1.0, 9.0]);
        assert_eq!(result.documents[0].as_deref(), Some("near\nTAGS: t"));
    }

    #[tokio::test]
    async fn test_upsert_is_last_write_wins() {
        let store = MemoryStore::new("items");
        store.upsert(vec![record("a", vec![1.0]), record("b", vec![2.0])]).await.unwrap();

        let mut replacement = record("a", vec![5.0]);
        replacement.document = "replaced".to_string();
        store.upsert(vec![replacement]).await.unwrap();

        let got = store.get(vec!["a".to_string()]).await.unwrap();
        assert_eq!(got[0].embedding, Some(vec![5.0]));
        assert_eq!(got[0].document.as_deref(), Some("replaced"));
        assert_eq!(ids(&store).await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_rejected_batch_leaves_collection_untouched() {
        let store = MemoryStore::new("items");
        store.upsert(vec![record("a", vec![1.0, 0.0])]).await.unwrap();

        let err = store
            .upsert(vec![record("b", vec![0.0, 1.0]), record("c", vec![1.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, MoodboardError::Store(_)));

        assert_eq!(ids(&store).await, vec!["a"]);
        assert!(store.get(vec!["b".to_string()]).await.unwrap().is_empty());
        let hits = store.query(vec![0.0, 1.0], 5).await.unwrap();
        assert_eq!(hits.ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_mixed_dimensions_in_first_batch_are_rejected() {
        let store = MemoryStore::new("items");

        let result = store
            .upsert(vec![record("a", vec![1.0, 0.0]), record("b", vec![1.0])])
            .await;
        assert!(result.is_err());
        assert!(ids(&store).await.is_empty());
    }

    #[tokio::test]
    async fn test_get_skips_unknown_ids() {
        let store = MemoryStore::new("items");
        store.upsert(vec![record("a", vec![1.0])]).await.unwrap();

        let got = store
            .get(vec!["missing".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "a");
    }

    #[tokio::test]
    async fn test_peek_omits_embeddings_and_respects_limit() {
        let store = MemoryStore::new("items");
        store
            .upsert(vec![record("a", vec![1.0]), record("b", vec![2.0]), record("c", vec![3.0])])
            .await
            .unwrap();

        let peeked = store.peek(2).await.unwrap();
        assert_eq!(peeked.len(), 2);
        assert!(peeked.iter().all(|r| r.embedding.is_none()));
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch_is_rejected() {
        let store = MemoryStore::new("items");
        store.upsert(vec![record("a", vec![1.0, 2.0])]).await.unwrap();

        assert!(store.query(vec![1.0], 1).await.is_err());
    }

    #[tokio::test]
    async fn test_query_on_empty_collection() {
        let store = MemoryStore::new("items");
        let result = store.query(vec![1.0, 2.0], 5).await.unwrap();
        assert!(result.ids.is_empty());
    }
}
