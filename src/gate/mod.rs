//! Confidence gating: refuse-or-answer decisions over relevance scores.
//!
//! Two strategies sit behind one interface, selected by which upstream stage
//! produced the scores. Reranked scores live on an absolute 0-3 scale where
//! a threshold is meaningful; raw retrieval scores are not comparable across
//! methods or corpora, so only the separation between the best and
//! second-best candidate counts as a confidence signal there.
//!
//! Both strategies are pure functions over a score slice. Refusal is not an
//! error; it is a first-class outcome with a stable reason code.

pub mod types;


pub use types::{GateDecision, RefusalReason};

use tracing::debug;

use crate::constants::{
    DEFAULT_MIN_CHUNKS_ABOVE_THRESHOLD, DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_RETRIEVAL_MIN_RATIO,
    DEFAULT_RETRIEVAL_MIN_SCORE,
};

/// A refuse-or-answer decision function over a descending-priority score
/// slice. Implementations hold thresholds only, never per-query state.
pub trait GateStrategy {
    fn evaluate(&self, scores: &[f64]) -> GateDecision;
}

/// Gate over reranked relevance scores (0-3 scale).
#[derive(Debug, Clone, Copy)]
pub struct RerankedGate {
    /// Minimum relevance a chunk must reach to count toward acceptance.
    pub relevance_threshold: f64,
    /// Minimum number of chunks at or above the threshold.
    pub min_chunks: usize,
}

impl Default for RerankedGate {
    fn default() -> Self {
        Self {
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            min_chunks: DEFAULT_MIN_CHUNKS_ABOVE_THRESHOLD,
        }
    }
}

impl GateStrategy for RerankedGate {
    fn evaluate(&self, scores: &[f64]) -> GateDecision {
        if scores.is_empty() {
            return GateDecision::Refuse(RefusalReason::NoChunksRetrieved);
        }

        let above = scores
            .iter()
            .filter(|s| **s >= self.relevance_threshold)
            .count();

        let decision = if above == 0 {
            GateDecision::Refuse(RefusalReason::AllChunksBelowThreshold)
        } else if above < self.min_chunks {
            GateDecision::Refuse(RefusalReason::InsufficientChunksAboveThreshold)
        } else {
            GateDecision::Answer
        };

        debug!(
            chunks = scores.len(),
            above_threshold = above,
            refused = decision.is_refusal(),
            "reranked gate evaluated"
        );

        decision
    }
}

/// Gate over raw retrieval scores, used when reranking was skipped.
///
/// With two or more candidates the decision rests on relative separation:
/// `top1 / top2` must reach `min_ratio`. When `top2` is non-positive the
/// ratio is undefined; the fallback requires `top1 >= 2 * min_score` and
/// substitutes `(top1 - top2) / min_score` as the ratio. That substitution
/// is kept for compatibility with established behavior; recalibrating it is
/// a candidate for a future pass.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalGate {
    /// Floor below which a retrieval score carries no confidence.
    pub min_score: f64,
    /// Required separation between the best and second-best score.
    pub min_ratio: f64,
}

impl Default for RetrievalGate {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_RETRIEVAL_MIN_SCORE,
            min_ratio: DEFAULT_RETRIEVAL_MIN_RATIO,
        }
    }
}

impl GateStrategy for RetrievalGate {
    fn evaluate(&self, scores: &[f64]) -> GateDecision {
        if scores.is_empty() {
            return GateDecision::Refuse(RefusalReason::NoChunksRetrieved);
        }

        if scores.len() == 1 {
            let decision = if scores[0] <= self.min_score {
                GateDecision::Refuse(RefusalReason::RetrievalScoreTooLow)
            } else {
                GateDecision::Answer
            };
            debug!(top1 = scores[0], refused = decision.is_refusal(), "retrieval gate evaluated");
            return decision;
        }

        let (top1, top2) = top_two(scores);

        if top1 <= self.min_score {
            return GateDecision::Refuse(RefusalReason::RetrievalTopBelowMinimum);
        }

        let ratio = if top2 > 0.0 {
            top1 / top2
        } else {
            if top1 < 2.0 * self.min_score {
                return GateDecision::Refuse(RefusalReason::RetrievalTop1TooWeakWithNegativeTop2);
            }
            (top1 - top2) / self.min_score
        };

        let decision = if ratio < self.min_ratio {
            GateDecision::Refuse(RefusalReason::RetrievalInsufficientRatio)
        } else {
            GateDecision::Answer
        };

        debug!(top1, top2, ratio, refused = decision.is_refusal(), "retrieval gate evaluated");

        decision
    }
}

/// Returns the two highest scores without assuming the input is sorted.
fn top_two(scores: &[f64]) -> (f64, f64) {
    let mut top1 = f64::NEG_INFINITY;
    let mut top2 = f64::NEG_INFINITY;
    for &s in scores {
        if s > top1 {
            top2 = top1;
            top1 = s;
        } else if s > top2 {
            top2 = s;
        }
    }
    (top1, top2)
}
