use crate::corpus::ChunkMetadata;
use crate::search::{ResultSource, SearchResult};

/// A retrieval result annotated with an LLM-assigned relevance score.
///
/// Created by the reranker, consumed by the gate and the budgeter, discarded
/// at the end of the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Corpus chunk id.
    pub chunk_id: String,
    /// Chunk text.
    pub text: String,
    /// Normalized chunk metadata.
    pub metadata: ChunkMetadata,
    /// LLM-assigned relevance, always in `0..=3`.
    pub relevance_score: u8,
    /// Model justification, or the recovery reason when scoring degraded.
    /// May be empty.
    pub explanation: String,
    /// Pre-rerank retrieval score.
    pub original_score: f64,
    /// Retrieval method of the underlying result.
    pub source: ResultSource,
}

impl ScoredChunk {
    /// Annotates a retrieval result with a relevance score.
    pub fn from_result(result: SearchResult, relevance_score: u8, explanation: String) -> Self {
        Self {
            chunk_id: result.chunk_id,
            text: result.text,
            metadata: result.metadata,
            relevance_score: relevance_score.min(3),
            explanation,
            original_score: result.score,
            source: result.source,
        }
    }

    /// Wraps a result with the neutral score used when reranking is skipped
    /// or a scoring call degrades.
    pub fn neutral(result: SearchResult, explanation: String) -> Self {
        Self::from_result(result, 1, explanation)
    }
}
