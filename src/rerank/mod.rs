//! LLM-based relevance reranking.
//!
//! Each candidate chunk is scored 0-3 against the question by the external
//! scoring model. Calls run concurrently through a bounded worker pool
//! (semaphore-limited, default 5 in flight) and results are collected in
//! original index order, so downstream sorting is deterministic regardless of
//! scheduling.
//!
//! A single chunk's scoring failure never fails the query: call errors,
//! timeouts, and unparseable responses all degrade to a neutral score of 1
//! with the cause recorded as the explanation.

pub mod parse;
pub mod types;


pub use parse::parse_score_response;
pub use types::ScoredChunk;

use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_MAX_KEPT_CHUNKS, DEFAULT_MIN_RELEVANCE, DEFAULT_RERANK_CONCURRENCY,
    DEFAULT_RERANK_MAX_CHARS, DEFAULT_RERANK_TIMEOUT_SECS, RERANK_RESPONSE_MAX_TOKENS,
};
use crate::llm::{GenerationOptions, TextGenerator};
use crate::search::SearchResult;

/// The fixed relevance scale sent to the scoring model.
pub const RELEVANCE_SCALE: &str = "\
3 = directly answers or contains critical required detail
2 = useful supporting context
1 = tangentially related
0 = unrelated";

const SCORING_SYSTEM_PROMPT: &str = "\
You rate how relevant an excerpt from a licensing document is to a question. \
Reply with 'Score: N' where N is an integer from 0 to 3, optionally followed \
by 'Explanation: <one sentence>'.";

/// Reranker tuning knobs.
#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Minimum relevance score a chunk needs to be kept.
    pub min_score: u8,
    /// Maximum number of kept chunks.
    pub max_chunks: usize,
    /// Maximum concurrent scoring calls.
    pub concurrency: usize,
    /// Per-call timeout on the scoring model.
    pub timeout: Duration,
    /// Chunk text is truncated to this many characters before scoring.
    pub max_chars: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_RELEVANCE,
            max_chunks: DEFAULT_MAX_KEPT_CHUNKS,
            concurrency: DEFAULT_RERANK_CONCURRENCY,
            timeout: Duration::from_secs(DEFAULT_RERANK_TIMEOUT_SECS),
            max_chars: DEFAULT_RERANK_MAX_CHARS,
        }
    }
}

/// Scores candidate chunks against the question via the external model.
pub struct Reranker<G: TextGenerator> {
    generator: G,
    config: RerankerConfig,
}

impl<G: TextGenerator> std::fmt::Debug for Reranker<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<G: TextGenerator> Reranker<G> {
    /// Creates a reranker with default tuning.
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, RerankerConfig::default())
    }

    /// Creates a reranker with explicit tuning.
    pub fn with_config(generator: G, config: RerankerConfig) -> Self {
        Self { generator, config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    /// Scores every chunk and splits them into `(kept, dropped)`.
    ///
    /// Kept chunks score at least `min_score`, at most `max_chunks` of them,
    /// ordered by `(relevance desc, original score desc)`. No chunk appears
    /// in both lists.
    pub async fn score(
        &self,
        question: &str,
        chunks: Vec<SearchResult>,
    ) -> (Vec<ScoredChunk>, Vec<ScoredChunk>) {
        if chunks.is_empty() {
            return (Vec::new(), Vec::new());
        }

        debug!(
            candidates = chunks.len(),
            concurrency = self.config.concurrency,
            "starting rerank"
        );

        let semaphore = Semaphore::new(self.config.concurrency.max(1));

        let futures = chunks.into_iter().enumerate().map(|(idx, chunk)| {
            let semaphore = &semaphore;
            async move {
                // Closed-semaphore errors cannot happen here; degrade rather
                // than panic if they ever do.
                let _permit = semaphore.acquire().await.ok();
                self.score_one(question, idx, chunk).await
            }
        });

        // join_all preserves input order, so results come back keyed by the
        // original index, not by completion order.
        let scored = join_all(futures).await;

        let (kept, dropped) = self.select(scored);

        info!(
            kept = kept.len(),
            dropped = dropped.len(),
            top_relevance = kept.first().map(|c| c.relevance_score),
            "rerank complete"
        );

        (kept, dropped)
    }

    /// Scores a single chunk, degrading to the neutral score on any failure.
    async fn score_one(&self, question: &str, idx: usize, chunk: SearchResult) -> ScoredChunk {
        let excerpt = truncate_chars(&chunk.text, self.config.max_chars);
        let user_prompt = format!(
            "Question: {question}\n\nExcerpt:\n{excerpt}\n\nScale:\n{RELEVANCE_SCALE}\n\n\
             Rate the excerpt's relevance to the question."
        );

        let options = GenerationOptions {
            max_tokens: RERANK_RESPONSE_MAX_TOKENS,
            temperature: 0.0,
        };

        let outcome = timeout(
            self.config.timeout,
            self.generator
                .generate(SCORING_SYSTEM_PROMPT, &user_prompt, options),
        )
        .await;

        match outcome {
            Ok(Ok(response)) => match parse_score_response(&response) {
                Some((score, explanation)) => {
                    debug!(idx, score, "chunk scored");
                    ScoredChunk::from_result(chunk, score, explanation)
                }
                None => {
                    warn!(idx, response_len = response.len(), "unparseable scoring response");
                    ScoredChunk::neutral(chunk, format!("unparseable scoring response: {response}"))
                }
            },
            Ok(Err(e)) => {
                warn!(idx, error = %e, "scoring call failed");
                ScoredChunk::neutral(chunk, format!("scoring call failed: {e}"))
            }
            Err(_) => {
                warn!(idx, timeout_secs = self.config.timeout.as_secs(), "scoring call timed out");
                ScoredChunk::neutral(
                    chunk,
                    format!(
                        "scoring call timed out after {}s",
                        self.config.timeout.as_secs()
                    ),
                )
            }
        }
    }

    /// Sorts by `(relevance desc, original score desc)` and splits into
    /// disjoint kept/dropped lists.
    fn select(&self, mut scored: Vec<ScoredChunk>) -> (Vec<ScoredChunk>, Vec<ScoredChunk>) {
        scored.sort_by(|a, b| {
            b.relevance_score.cmp(&a.relevance_score).then_with(|| {
                b.original_score
                    .partial_cmp(&a.original_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for chunk in scored {
            if chunk.relevance_score >= self.config.min_score && kept.len() < self.config.max_chunks
            {
                kept.push(chunk);
            } else {
                dropped.push(chunk);
            }
        }

        (kept, dropped)
    }
}

/// Truncates to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
