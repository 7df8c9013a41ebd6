//! Query pipeline orchestration.
//!
//! One request-scoped flow: search, optional rerank, confidence gate, token
//! budget. Stages run strictly sequentially, each consuming the previous
//! stage's output; only the reranker parallelizes internally. The returned
//! future is drop-cancellable and every outbound call carries a timeout, so
//! dropping the future stops in-flight work promptly.
//!
//! Which gate runs depends on which scores exist: reranked relevance scores
//! when the reranker ran, raw retrieval scores otherwise. A refusal
//! short-circuits budgeting; refusal is an outcome, not an error.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::PipelineError;

use tracing::{info, instrument};

use crate::budget::{BudgetInfo, ContextBudgeter};
use crate::definitions::DefinitionsCache;
use crate::gate::{GateDecision, GateStrategy, RerankedGate, RetrievalGate};
use crate::llm::TextGenerator;
use crate::rerank::{Reranker, ScoredChunk};
use crate::search::{HybridSearcher, SearchMode};
use crate::tokenize::TokenCounter;
use crate::vectordb::VectorStore;

/// Result of one pipeline run, handed to the answer-generation step.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Chunks that survived gating and budgeting, ready for the prompt.
    /// Empty on refusal.
    pub final_chunks: Vec<ScoredChunk>,
    /// Answer-or-refuse decision with its reason code.
    pub decision: GateDecision,
    /// Budgeting record; `None` when the gate refused before budgeting.
    pub budget: Option<BudgetInfo>,
}

/// Sequences retrieval, reranking, gating, and budgeting for one question.
pub struct QueryPipeline<V, G, T>
where
    V: VectorStore,
    G: TextGenerator,
    T: TokenCounter,
{
    searcher: HybridSearcher<V>,
    reranker: Option<Reranker<G>>,
    budgeter: ContextBudgeter<T>,
    definitions: Option<DefinitionsCache>,
    reranked_gate: RerankedGate,
    retrieval_gate: RetrievalGate,
}

impl<V, G, T> std::fmt::Debug for QueryPipeline<V, G, T>
where
    V: VectorStore,
    G: TextGenerator,
    T: TokenCounter,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("rerank_enabled", &self.reranker.is_some())
            .field("definitions_enabled", &self.definitions.is_some())
            .finish_non_exhaustive()
    }
}

impl<V, G, T> QueryPipeline<V, G, T>
where
    V: VectorStore,
    G: TextGenerator,
    T: TokenCounter,
{
    /// Assembles a pipeline. `reranker: None` skips the rerank stage and
    /// gates on raw retrieval scores instead.
    pub fn new(
        searcher: HybridSearcher<V>,
        reranker: Option<Reranker<G>>,
        budgeter: ContextBudgeter<T>,
    ) -> Self {
        Self {
            searcher,
            reranker,
            budgeter,
            definitions: None,
            reranked_gate: RerankedGate::default(),
            retrieval_gate: RetrievalGate::default(),
        }
    }

    /// Attaches the defined-terms cache.
    pub fn with_definitions(mut self, definitions: DefinitionsCache) -> Self {
        self.definitions = Some(definitions);
        self
    }

    /// Replaces both gate strategies.
    pub fn with_gates(mut self, reranked: RerankedGate, retrieval: RetrievalGate) -> Self {
        self.reranked_gate = reranked;
        self.retrieval_gate = retrieval;
        self
    }

    /// Runs the full pipeline for one question.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn search(
        &self,
        question: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> Result<PipelineOutcome, PipelineError> {
        let results = self.searcher.search(question, mode, top_k).await?;

        // Gate input must cover every retrieved chunk, not just survivors,
        // so the decision sees the full confidence picture.
        let (candidates, decision) = match &self.reranker {
            Some(reranker) => {
                let (kept, dropped) = reranker.score(question, results).await;
                let scores: Vec<f64> = kept
                    .iter()
                    .chain(dropped.iter())
                    .map(|c| f64::from(c.relevance_score))
                    .collect();
                let decision = self.reranked_gate.evaluate(&scores);
                (kept, decision)
            }
            None => {
                let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
                let decision = self.retrieval_gate.evaluate(&scores);
                let candidates = results
                    .into_iter()
                    .map(|r| ScoredChunk::neutral(r, String::new()))
                    .collect();
                (candidates, decision)
            }
        };

        if let GateDecision::Refuse(reason) = decision {
            info!(reason = %reason, "query refused by confidence gate");
            return Ok(PipelineOutcome {
                final_chunks: Vec::new(),
                decision,
                budget: None,
            });
        }

        let definitions_block = self.definitions.as_ref().and_then(|cache| {
            cache.block_for(candidates.iter().map(|c| c.text.as_str()))
        });

        let (final_chunks, budget) =
            self.budgeter
                .apply(question, definitions_block.as_deref(), candidates);

        info!(
            final_chunks = final_chunks.len(),
            total_tokens = budget.total_tokens,
            under_budget = budget.under_budget,
            "query pipeline complete"
        );

        Ok(PipelineOutcome {
            final_chunks,
            decision,
            budget: Some(budget),
        })
    }
}
