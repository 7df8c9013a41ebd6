use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::error::VectorStoreError;
use super::model::{VectorGetResponse, VectorQueryResponse};
use super::VectorStore;

/// Deterministic in-memory [`VectorStore`] for tests.
///
/// Every stored chunk carries a fixed embedding distance; `query` returns the
/// stored chunks ordered by that distance regardless of the query text, which
/// keeps pipeline tests reproducible.
#[derive(Default)]
pub struct MockVectorStore {
    chunks: RwLock<HashMap<String, MockStoredChunk>>,
}

#[derive(Clone)]
struct MockStoredChunk {
    text: String,
    metadata: Value,
    distance: f64,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a chunk with a fixed distance for every query.
    pub fn insert(&self, chunk_id: &str, text: &str, metadata: Value, distance: f64) {
        self.chunks.write().expect("lock poisoned").insert(
            chunk_id.to_string(),
            MockStoredChunk {
                text: text.to_string(),
                metadata,
                distance,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.chunks.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().expect("lock poisoned").is_empty()
    }
}

impl VectorStore for MockVectorStore {
    async fn query(&self, _text: &str, n: usize) -> Result<VectorQueryResponse, VectorStoreError> {
        let chunks = self.chunks.read().expect("lock poisoned");

        let mut hits: Vec<(String, MockStoredChunk)> = chunks
            .iter()
            .map(|(id, chunk)| (id.clone(), chunk.clone()))
            .collect();

        hits.sort_by(|a, b| {
            a.1.distance
                .partial_cmp(&b.1.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        hits.truncate(n);

        let mut response = VectorQueryResponse::default();
        for (id, chunk) in hits {
            response.ids.push(id);
            response.documents.push(chunk.text);
            response.metadatas.push(chunk.metadata);
            response.distances.push(chunk.distance);
        }

        Ok(response)
    }

    async fn get(&self, ids: &[String]) -> Result<VectorGetResponse, VectorStoreError> {
        let chunks = self.chunks.read().expect("lock poisoned");

        let mut response = VectorGetResponse::default();
        for id in ids {
            if let Some(chunk) = chunks.get(id) {
                response.ids.push(id.clone());
                response.documents.push(chunk.text.clone());
                response.metadatas.push(chunk.metadata.clone());
            }
        }

        Ok(response)
    }
}
