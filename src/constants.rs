//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//! Most of these are defaults only; runtime values flow through
//! [`Config`](crate::config::Config) and per-module config structs.

/// RRF smoothing constant: fused score contribution is `1 / (k + rank)`.
///
/// Higher k reduces the influence of high-ranking items from any single list.
pub const RRF_K: f64 = 60.0;

/// Candidate over-fetch multiplier for hybrid search (`candidates = top_k * multiplier`).
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 3;

/// Hard cap on candidates fetched per retrieval method, bounding fusion cost.
pub const MAX_FUSION_CANDIDATES: usize = 12;

/// BM25 term-frequency saturation parameter.
pub const BM25_K1: f64 = 1.5;

/// BM25 length-normalization parameter.
pub const BM25_B: f64 = 0.75;

/// Tokens shorter than this are dropped during keyword tokenization.
pub const MIN_TOKEN_LEN: usize = 2;

/// Maximum concurrent scoring calls during reranking.
pub const DEFAULT_RERANK_CONCURRENCY: usize = 5;

/// Per-call timeout for a single scoring request, in seconds.
pub const DEFAULT_RERANK_TIMEOUT_SECS: u64 = 20;

/// Chunk text sent to the scoring model is truncated to this many characters.
pub const DEFAULT_RERANK_MAX_CHARS: usize = 4000;

/// Maximum completion tokens requested from the scoring model.
pub const RERANK_RESPONSE_MAX_TOKENS: u32 = 100;

/// Minimum relevance score (0-3 scale) a chunk needs to be kept after reranking.
pub const DEFAULT_MIN_RELEVANCE: u8 = 2;

/// Maximum chunks kept after reranking.
pub const DEFAULT_MAX_KEPT_CHUNKS: usize = 5;

/// Reranked-score gate: at least one chunk must score at or above this.
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 2.0;

/// Reranked-score gate: minimum number of chunks at or above the threshold.
pub const DEFAULT_MIN_CHUNKS_ABOVE_THRESHOLD: usize = 1;

/// Retrieval-score gate: absolute floor below which a top score is untrustworthy.
pub const DEFAULT_RETRIEVAL_MIN_SCORE: f64 = 0.05;

/// Retrieval-score gate: required top1/top2 separation ratio.
pub const DEFAULT_RETRIEVAL_MIN_RATIO: f64 = 1.2;

/// Token ceiling for the assembled generation prompt.
pub const DEFAULT_MAX_CONTEXT_TOKENS: usize = 6_000;

/// Bounded capacity of the definitions LRU cache.
pub const DEFAULT_DEFINITIONS_CACHE_CAPACITY: u64 = 1_024;

/// Characters-per-token ratio used by the heuristic token counter.
pub const HEURISTIC_CHARS_PER_TOKEN: usize = 4;
