/// Outcome of the confidence gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Confidence is sufficient; proceed to answer generation.
    Answer,
    /// Confidence is insufficient; refuse with a stable reason code.
    Refuse(RefusalReason),
}

impl GateDecision {
    /// Returns `true` for [`GateDecision::Refuse`].
    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refuse(_))
    }

    /// Returns the refusal reason, if any.
    pub fn reason(&self) -> Option<RefusalReason> {
        match self {
            Self::Answer => None,
            Self::Refuse(reason) => Some(*reason),
        }
    }
}

/// Why the gate refused.
///
/// Reasons are a closed set of stable codes so the decision stays
/// machine-testable independent of wording. No raw internal error text ever
/// reaches the end user; each code maps to one fixed sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// Retrieval returned nothing at all.
    NoChunksRetrieved,
    /// No reranked chunk reached the relevance threshold.
    AllChunksBelowThreshold,
    /// Fewer chunks reached the threshold than the configured minimum.
    InsufficientChunksAboveThreshold,
    /// The only retrieved chunk scored at or below the minimum.
    RetrievalScoreTooLow,
    /// The best retrieval score is at or below the minimum.
    RetrievalTopBelowMinimum,
    /// Second-best score was non-positive and the best score is too weak
    /// to stand alone.
    RetrievalTop1TooWeakWithNegativeTop2,
    /// The best score does not separate enough from the second best.
    RetrievalInsufficientRatio,
}

impl RefusalReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoChunksRetrieved => "no_chunks_retrieved",
            Self::AllChunksBelowThreshold => "all_chunks_below_threshold",
            Self::InsufficientChunksAboveThreshold => "insufficient_chunks_above_threshold",
            Self::RetrievalScoreTooLow => "retrieval_score_too_low",
            Self::RetrievalTopBelowMinimum => "retrieval_top_below_minimum",
            Self::RetrievalTop1TooWeakWithNegativeTop2 => {
                "retrieval_top1_too_weak_with_negative_top2"
            }
            Self::RetrievalInsufficientRatio => "retrieval_insufficient_ratio",
        }
    }

    /// Fixed user-facing sentence for this code.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoChunksRetrieved => {
                "No relevant passages were found for this question."
            }
            Self::AllChunksBelowThreshold => {
                "The retrieved passages are not relevant enough to answer confidently."
            }
            Self::InsufficientChunksAboveThreshold => {
                "Too few sufficiently relevant passages were found to answer confidently."
            }
            Self::RetrievalScoreTooLow => {
                "The single retrieved passage matched the question too weakly."
            }
            Self::RetrievalTopBelowMinimum => {
                "The best matching passage scored below the confidence minimum."
            }
            Self::RetrievalTop1TooWeakWithNegativeTop2 => {
                "The best matching passage is too weak to stand alone."
            }
            Self::RetrievalInsufficientRatio => {
                "No passage stands out clearly enough from the rest to answer confidently."
            }
        }
    }
}

impl std::fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
