//! Hybrid retrieval: vector + keyword search merged by reciprocal rank fusion.
//!
//! Each query is stateless; the [`SearchMode`] is supplied per call. In
//! hybrid mode both methods are over-fetched (`top_k * multiplier`, capped),
//! fused with RRF (k = 60), deduplicated, and re-hydrated with text and
//! metadata. If the keyword side yields nothing, hybrid falls back silently
//! to vector-only results; the fallback is logged, not fatal.

pub mod error;
pub mod rrf;
pub mod types;


pub use error::SearchError;
pub use types::{InvalidSearchMode, ResultSource, SearchMode, SearchResult};

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::constants::{DEFAULT_CANDIDATE_MULTIPLIER, MAX_FUSION_CANDIDATES, RRF_K};
use crate::corpus::ChunkMetadata;
use crate::keyword::KeywordIndex;
use crate::vectordb::model::distance_to_similarity;
use crate::vectordb::VectorStore;

/// Tuning knobs for hybrid retrieval.
#[derive(Debug, Clone, Copy)]
pub struct HybridSearcherConfig {
    /// Over-fetch factor: each method retrieves `top_k * candidate_multiplier`.
    pub candidate_multiplier: usize,
    /// Hard cap on per-method candidates, bounding fusion cost.
    pub max_candidates: usize,
    /// RRF smoothing constant.
    pub rrf_k: f64,
}

impl Default for HybridSearcherConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
            max_candidates: MAX_FUSION_CANDIDATES,
            rrf_k: RRF_K,
        }
    }
}

/// Orchestrates vector and keyword retrieval over one corpus.
pub struct HybridSearcher<V: VectorStore> {
    store: V,
    keyword: Option<KeywordIndex>,
    config: HybridSearcherConfig,
}

impl<V: VectorStore> std::fmt::Debug for HybridSearcher<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearcher")
            .field("keyword_available", &self.keyword.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<V: VectorStore> HybridSearcher<V> {
    /// Creates a searcher. `keyword` is `None` when no index could be loaded;
    /// keyword and hybrid queries then degrade to empty / vector-only.
    pub fn new(store: V, keyword: Option<KeywordIndex>) -> Self {
        Self::with_config(store, keyword, HybridSearcherConfig::default())
    }

    /// Creates a searcher with explicit tuning.
    pub fn with_config(
        store: V,
        keyword: Option<KeywordIndex>,
        config: HybridSearcherConfig,
    ) -> Self {
        Self {
            store,
            keyword,
            config,
        }
    }

    /// Returns `true` if a keyword index is loaded.
    pub fn keyword_available(&self) -> bool {
        self.keyword.is_some()
    }

    /// Runs one retrieval in the requested mode.
    pub async fn search(
        &self,
        question: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match mode {
            SearchMode::Vector => self.vector_search(question, top_k).await,
            SearchMode::Keyword => Ok(self.keyword_search(question, top_k).await),
            SearchMode::Hybrid => self.hybrid_search(question, top_k).await,
        }
    }

    /// Vector similarity retrieval; distances become `1/(1+distance)` scores.
    async fn vector_search(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self.store.query(question, top_k).await?;

        let results = response
            .ids
            .into_iter()
            .zip(response.documents)
            .zip(response.metadatas)
            .zip(response.distances)
            .map(|(((chunk_id, text), metadata), distance)| SearchResult {
                chunk_id,
                text,
                metadata: ChunkMetadata::from_value(&metadata),
                score: distance_to_similarity(distance),
                source: ResultSource::Vector,
            })
            .collect();

        Ok(results)
    }

    /// BM25 keyword retrieval. Returns empty when no index is available; the
    /// caller decides fallback.
    async fn keyword_search(&self, question: &str, top_k: usize) -> Vec<SearchResult> {
        let Some(index) = &self.keyword else {
            debug!("no keyword index available, returning empty keyword results");
            return Vec::new();
        };

        let hits = match index.query(question, top_k) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "keyword query failed, treating index as unavailable");
                return Vec::new();
            }
        };

        if hits.is_empty() {
            return Vec::new();
        }

        // The index persists raw text but not metadata; hydrate metadata from
        // the corpus, best effort.
        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let metadata_by_id = self.fetch_metadata(&ids).await;

        hits.into_iter()
            .map(|(chunk_id, score)| {
                let text = index.document_text(&chunk_id).unwrap_or_default().to_string();
                let metadata = metadata_by_id.get(&chunk_id).cloned().unwrap_or_default();
                SearchResult {
                    chunk_id,
                    text,
                    metadata,
                    score,
                    source: ResultSource::Keyword,
                }
            })
            .collect()
    }

    /// Vector + keyword retrieval merged by RRF; falls back to vector-only
    /// when the keyword side yields nothing.
    async fn hybrid_search(
        &self,
        question: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let candidates = top_k
            .saturating_mul(self.config.candidate_multiplier)
            .min(self.config.max_candidates);

        let vector_results = self.vector_search(question, candidates).await?;

        let keyword_hits: Vec<(String, f64)> = match &self.keyword {
            Some(index) => index.query(question, candidates).unwrap_or_else(|e| {
                warn!(error = %e, "keyword query failed during hybrid search");
                Vec::new()
            }),
            None => Vec::new(),
        };

        if keyword_hits.is_empty() {
            warn!(
                question_len = question.len(),
                "keyword side empty, falling back to vector-only results"
            );
            let mut fallback = vector_results;
            fallback.truncate(top_k);
            return Ok(fallback);
        }

        let vector_ids: Vec<String> = vector_results.iter().map(|r| r.chunk_id.clone()).collect();
        let keyword_ids: Vec<String> = keyword_hits.iter().map(|(id, _)| id.clone()).collect();

        let mut fused = rrf::fuse(&[vector_ids, keyword_ids], self.config.rrf_k);
        fused.truncate(top_k);

        debug!(
            vector_candidates = vector_results.len(),
            keyword_candidates = keyword_hits.len(),
            fused = fused.len(),
            "hybrid fusion complete"
        );

        // Re-attach text/metadata: prefer the vector candidates we already
        // hold, fetch the rest from the corpus.
        let mut by_id: HashMap<String, SearchResult> = vector_results
            .into_iter()
            .map(|r| (r.chunk_id.clone(), r))
            .collect();

        let missing: Vec<String> = fused
            .iter()
            .filter(|(id, _)| !by_id.contains_key(id))
            .map(|(id, _)| id.clone())
            .collect();

        if !missing.is_empty() {
            let metadata_by_id = self.fetch_chunks(&missing).await;
            for (id, (text, metadata)) in metadata_by_id {
                by_id.insert(
                    id.clone(),
                    SearchResult {
                        chunk_id: id,
                        text,
                        metadata,
                        score: 0.0,
                        source: ResultSource::Keyword,
                    },
                );
            }
        }

        let keyword_index = self.keyword.as_ref();
        let results = fused
            .into_iter()
            .filter_map(|(chunk_id, score)| {
                let (text, metadata) = match by_id.remove(&chunk_id) {
                    Some(result) => (result.text, result.metadata),
                    None => {
                        // Corpus fetch missed this id; the keyword index still
                        // has the raw text.
                        let text = keyword_index
                            .and_then(|idx| idx.document_text(&chunk_id))
                            .map(str::to_string)?;
                        (text, ChunkMetadata::default())
                    }
                };

                Some(SearchResult {
                    chunk_id,
                    text,
                    metadata,
                    score,
                    source: ResultSource::Hybrid,
                })
            })
            .collect();

        Ok(results)
    }

    /// Fetches `(text, metadata)` for ids from the corpus; failures degrade
    /// to an empty map with a warning.
    async fn fetch_chunks(&self, ids: &[String]) -> HashMap<String, (String, ChunkMetadata)> {
        match self.store.get(ids).await {
            Ok(response) => response
                .ids
                .into_iter()
                .zip(response.documents)
                .zip(response.metadatas)
                .map(|((id, text), metadata)| (id, (text, ChunkMetadata::from_value(&metadata))))
                .collect(),
            Err(e) => {
                warn!(error = %e, requested = ids.len(), "corpus fetch failed during hydration");
                HashMap::new()
            }
        }
    }

    async fn fetch_metadata(&self, ids: &[String]) -> HashMap<String, ChunkMetadata> {
        self.fetch_chunks(ids)
            .await
            .into_iter()
            .map(|(id, (_, metadata))| (id, metadata))
            .collect()
    }
}
