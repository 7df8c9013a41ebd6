//! Qdrant-backed [`VectorStore`] adapter.
//!
//! Chunks are stored as points whose payload carries the chunk text plus the
//! metadata fields consumed by [`ChunkMetadata::from_value`](crate::corpus::ChunkMetadata).
//! Qdrant returns cosine similarity scores; this adapter converts them to the
//! non-negative distances the pipeline expects.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{GetPointsBuilder, PointId, SearchPointsBuilder, Value};
use serde_json::json;

use super::error::VectorStoreError;
use super::model::{VectorGetResponse, VectorQueryResponse};
use super::{Embedder, VectorStore};

/// Vector store over a Qdrant collection, embedding queries through `E`.
pub struct QdrantVectorStore<E: Embedder> {
    client: Qdrant,
    collection: String,
    embedder: E,
}

impl<E: Embedder> std::fmt::Debug for QdrantVectorStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl<E: Embedder> QdrantVectorStore<E> {
    /// Connects to Qdrant at `url`, reading from `collection`.
    pub fn new(url: &str, collection: impl Into<String>, embedder: E) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::ConnectionFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            collection: collection.into(),
            embedder,
        })
    }

    /// Returns the collection this store reads from.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn chunk_id_from_point(id: Option<PointId>) -> Option<String> {
        match id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Uuid(s)) => Some(s),
            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
            None => None,
        }
    }

    fn point_id_for(chunk_id: &str) -> PointId {
        match chunk_id.parse::<u64>() {
            Ok(n) => PointId::from(n),
            Err(_) => PointId::from(chunk_id.to_string()),
        }
    }

    fn split_payload(payload: HashMap<String, Value>) -> (String, serde_json::Value) {
        let text = payload
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let metadata = json!({
            "provider": payload.get("provider").and_then(|v| v.as_str()),
            "document_path": payload.get("document_path").and_then(|v| v.as_str()),
            "section_heading": payload.get("section_heading").and_then(|v| v.as_str()),
            "page_start": payload.get("page_start").and_then(|v| v.as_integer()),
            "page_end": payload.get("page_end").and_then(|v| v.as_integer()),
            "is_definitions": payload.get("is_definitions").and_then(|v| v.as_bool()),
        });

        (text, metadata)
    }
}

impl<E: Embedder> VectorStore for QdrantVectorStore<E> {
    async fn query(&self, text: &str, n: usize) -> Result<VectorQueryResponse, VectorStoreError> {
        let vector: Vec<f32> = self.embedder.embed(text).await?;

        let search = SearchPointsBuilder::new(&self.collection, vector, n as u64)
            .with_payload(true);

        let search_result = self
            .client
            .search_points(search)
            .await
            .map_err(|e| VectorStoreError::SearchFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let mut response = VectorQueryResponse::default();
        for point in search_result.result {
            let Some(chunk_id) = Self::chunk_id_from_point(point.id) else {
                continue;
            };

            // Cosine similarity -> distance, clamped so downstream math sees
            // the documented non-negative contract.
            let distance = (1.0 - f64::from(point.score)).max(0.0);
            let (text, metadata) = Self::split_payload(point.payload);

            response.ids.push(chunk_id);
            response.documents.push(text);
            response.metadatas.push(metadata);
            response.distances.push(distance);
        }

        Ok(response)
    }

    async fn get(&self, ids: &[String]) -> Result<VectorGetResponse, VectorStoreError> {
        if ids.is_empty() {
            return Ok(VectorGetResponse::default());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|id| Self::point_id_for(id)).collect();

        let get_result = self
            .client
            .get_points(GetPointsBuilder::new(&self.collection, point_ids).with_payload(true))
            .await
            .map_err(|e| VectorStoreError::GetFailed {
                collection: self.collection.clone(),
                message: e.to_string(),
            })?;

        let mut response = VectorGetResponse::default();
        for point in get_result.result {
            let Some(chunk_id) = Self::chunk_id_from_point(point.id) else {
                continue;
            };
            let (text, metadata) = Self::split_payload(point.payload);

            response.ids.push(chunk_id);
            response.documents.push(text);
            response.metadatas.push(metadata);
        }

        Ok(response)
    }
}
