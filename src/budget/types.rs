use std::str::FromStr;

/// Reason string attached to every chunk dropped by the budgeter.
pub const REASON_EXCEEDED_TOKEN_BUDGET: &str = "exceeded_token_budget";

/// How the token ceiling is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetMode {
    /// Sum per-chunk token counts and accept greedily. Cheap but ignores
    /// templating overhead.
    Additive,
    /// Render the literal final prompt and measure it, dropping one chunk at
    /// a time until it fits. Exact, and the default.
    #[default]
    FullPrompt,
}

impl BudgetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::FullPrompt => "full_prompt",
        }
    }
}

/// Error for an unrecognized budget mode string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid budget mode '{value}', expected one of: additive, full_prompt")]
pub struct InvalidBudgetMode {
    pub value: String,
}

impl FromStr for BudgetMode {
    type Err = InvalidBudgetMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "additive" => Ok(Self::Additive),
            "full_prompt" | "full-prompt" => Ok(Self::FullPrompt),
            other => Err(InvalidBudgetMode {
                value: other.to_string(),
            }),
        }
    }
}

/// A chunk rejected by the budgeter.
#[derive(Debug, Clone)]
pub struct DroppedChunk {
    pub chunk_id: String,
    /// Relevance score the chunk carried when dropped.
    pub score: u8,
    /// Token count of the chunk's formatted representation.
    pub token_count: usize,
    pub reason: &'static str,
}

/// Outcome record of one budgeting pass. Budgeting never errors; callers
/// inspect this record to log or surface partial degradation.
#[derive(Debug, Clone)]
pub struct BudgetInfo {
    pub original_count: usize,
    pub kept_count: usize,
    pub dropped_count: usize,
    /// Measured tokens of the kept material (mode-dependent: per-chunk sum in
    /// additive mode, full rendered prompt in full-prompt mode).
    pub total_tokens: usize,
    pub max_tokens: usize,
    /// `total_tokens <= max_tokens` whenever this is true.
    pub under_budget: bool,
    pub dropped: Vec<DroppedChunk>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_mode_round_trip() {
        assert_eq!("additive".parse::<BudgetMode>(), Ok(BudgetMode::Additive));
        assert_eq!("full_prompt".parse::<BudgetMode>(), Ok(BudgetMode::FullPrompt));
        assert_eq!("FULL-PROMPT".parse::<BudgetMode>(), Ok(BudgetMode::FullPrompt));
        assert_eq!(BudgetMode::Additive.as_str(), "additive");
        assert!("tokenwise".parse::<BudgetMode>().is_err());
    }
}
