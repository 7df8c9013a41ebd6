//! Token-budget enforcement on the final generation prompt.
//!
//! Two modes share one goal: keep the assembled context under `max_tokens`.
//! Additive mode sums per-chunk token counts and accepts greedily; it is
//! cheap but blind to templating overhead. Full-prompt mode renders the
//! literal final prompt and measures it, dropping the single lowest-priority
//! chunk and re-measuring until it fits; budget is not additive across
//! components once the template and definitions text are included, so only
//! the full render gives an exact answer.
//!
//! Budgeting never errors. Even an impossible budget (the zero-chunk prompt
//! alone exceeds the limit) is reported through [`BudgetInfo`], not raised.

pub mod template;
pub mod types;


pub use template::PromptTemplate;
pub use types::{BudgetInfo, BudgetMode, DroppedChunk, InvalidBudgetMode};

use tracing::{debug, warn};

use crate::constants::DEFAULT_MAX_CONTEXT_TOKENS;
use crate::rerank::ScoredChunk;
use crate::tokenize::TokenCounter;
use types::REASON_EXCEEDED_TOKEN_BUDGET;

/// Enforces the token ceiling on gated chunks before answer generation.
pub struct ContextBudgeter<T: TokenCounter> {
    counter: T,
    template: PromptTemplate,
    max_tokens: usize,
    mode: BudgetMode,
}

impl<T: TokenCounter> std::fmt::Debug for ContextBudgeter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBudgeter")
            .field("max_tokens", &self.max_tokens)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<T: TokenCounter> ContextBudgeter<T> {
    /// Creates a budgeter with the default template and token ceiling.
    pub fn new(counter: T) -> Self {
        Self::with_limits(counter, DEFAULT_MAX_CONTEXT_TOKENS, BudgetMode::default())
    }

    /// Creates a budgeter with an explicit ceiling and mode.
    pub fn with_limits(counter: T, max_tokens: usize, mode: BudgetMode) -> Self {
        Self {
            counter,
            template: PromptTemplate::default(),
            max_tokens,
            mode,
        }
    }

    /// Replaces the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn mode(&self) -> BudgetMode {
        self.mode
    }

    /// Applies the configured mode and returns the kept chunks plus the
    /// budgeting record.
    pub fn apply(
        &self,
        question: &str,
        definitions_block: Option<&str>,
        chunks: Vec<ScoredChunk>,
    ) -> (Vec<ScoredChunk>, BudgetInfo) {
        let (kept, info) = match self.mode {
            BudgetMode::Additive => self.apply_additive(chunks),
            BudgetMode::FullPrompt => self.apply_full_prompt(question, definitions_block, chunks),
        };

        if !info.under_budget {
            warn!(
                total_tokens = info.total_tokens,
                max_tokens = info.max_tokens,
                "context exceeds token budget even after dropping all chunks"
            );
        } else if info.dropped_count > 0 {
            debug!(
                kept = info.kept_count,
                dropped = info.dropped_count,
                total_tokens = info.total_tokens,
                "chunks dropped to fit token budget"
            );
        }

        (kept, info)
    }

    /// Greedy per-chunk accounting: sort by `(relevance desc, size asc)` and
    /// accept while the running sum stays within budget.
    fn apply_additive(&self, chunks: Vec<ScoredChunk>) -> (Vec<ScoredChunk>, BudgetInfo) {
        let original_count = chunks.len();

        let mut sized: Vec<(ScoredChunk, usize)> = chunks
            .into_iter()
            .map(|chunk| {
                let tokens = self.counter.count_tokens(&self.template.format_chunk(&chunk));
                (chunk, tokens)
            })
            .collect();

        sized.sort_by(|(a, a_tokens), (b, b_tokens)| {
            b.relevance_score
                .cmp(&a.relevance_score)
                .then(a_tokens.cmp(b_tokens))
        });

        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        let mut total_tokens = 0usize;

        for (chunk, tokens) in sized {
            if total_tokens + tokens <= self.max_tokens {
                total_tokens += tokens;
                kept.push(chunk);
            } else {
                dropped.push(DroppedChunk {
                    chunk_id: chunk.chunk_id.clone(),
                    score: chunk.relevance_score,
                    token_count: tokens,
                    reason: REASON_EXCEEDED_TOKEN_BUDGET,
                });
            }
        }

        let info = BudgetInfo {
            original_count,
            kept_count: kept.len(),
            dropped_count: dropped.len(),
            total_tokens,
            max_tokens: self.max_tokens,
            under_budget: total_tokens <= self.max_tokens,
            dropped,
        };

        (kept, info)
    }

    /// Exact accounting: measure the rendered prompt and drop the single
    /// lowest-priority chunk until it fits or none remain.
    fn apply_full_prompt(
        &self,
        question: &str,
        definitions_block: Option<&str>,
        mut chunks: Vec<ScoredChunk>,
    ) -> (Vec<ScoredChunk>, BudgetInfo) {
        let original_count = chunks.len();
        let mut dropped = Vec::new();

        let total_tokens = loop {
            let prompt = self.template.render(question, definitions_block, &chunks);
            let tokens = self.counter.count_tokens(&prompt);

            if tokens <= self.max_tokens || chunks.is_empty() {
                break tokens;
            }

            // Lowest priority first: lowest relevance, then lowest retrieval
            // score.
            let victim_idx = lowest_priority_index(&chunks);
            let victim = chunks.remove(victim_idx);
            let victim_tokens = self.counter.count_tokens(&self.template.format_chunk(&victim));
            dropped.push(DroppedChunk {
                chunk_id: victim.chunk_id,
                score: victim.relevance_score,
                token_count: victim_tokens,
                reason: REASON_EXCEEDED_TOKEN_BUDGET,
            });
        };

        let info = BudgetInfo {
            original_count,
            kept_count: chunks.len(),
            dropped_count: dropped.len(),
            total_tokens,
            max_tokens: self.max_tokens,
            under_budget: total_tokens <= self.max_tokens,
            dropped,
        };

        (chunks, info)
    }
}

/// Index of the chunk with the lowest `(relevance_score, original_score)`.
fn lowest_priority_index(chunks: &[ScoredChunk]) -> usize {
    let mut idx = 0;
    for (i, chunk) in chunks.iter().enumerate().skip(1) {
        let current = &chunks[idx];
        let lower = chunk.relevance_score < current.relevance_score
            || (chunk.relevance_score == current.relevance_score
                && chunk.original_score < current.original_score);
        if lower {
            idx = i;
        }
    }
    idx
}
