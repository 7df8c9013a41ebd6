use std::str::FromStr;

use thiserror::Error;

use crate::corpus::ChunkMetadata;

/// Retrieval method that produced a result's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Embedding similarity (`1 / (1 + distance)`).
    Vector,
    /// BM25 keyword score.
    Keyword,
    /// Reciprocal-rank-fusion score over both methods.
    Hybrid,
}

impl ResultSource {
    /// Stable string form, used in logs and decision metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Vector => "vector",
            ResultSource::Keyword => "keyword",
            ResultSource::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested retrieval mode. Validated at the boundary; never a raw string
/// inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Vector similarity only.
    Vector,
    /// Keyword (BM25) only.
    Keyword,
    /// Both methods merged by reciprocal rank fusion.
    #[default]
    Hybrid,
}

/// A mode string that is not one of `vector`, `keyword`, `hybrid`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid search mode {value:?} (expected vector, keyword, or hybrid)")]
pub struct InvalidSearchMode {
    /// The rejected input.
    pub value: String,
}

impl FromStr for SearchMode {
    type Err = InvalidSearchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vector" => Ok(SearchMode::Vector),
            "keyword" => Ok(SearchMode::Keyword),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(InvalidSearchMode {
                value: other.to_string(),
            }),
        }
    }
}

/// A retrieved chunk with its per-query score. Created per query, discarded
/// after the pipeline run.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Corpus chunk id.
    pub chunk_id: String,
    /// Chunk text.
    pub text: String,
    /// Normalized chunk metadata.
    pub metadata: ChunkMetadata,
    /// Score whose meaning depends on `source`.
    pub score: f64,
    /// Which retrieval method produced `score`.
    pub source: ResultSource,
}
