//! Tokenizer collaborator for budget enforcement.
//!
//! The budgeter only needs token counts, so the interface is a single
//! synchronous method. Two implementations ship here: a HuggingFace
//! `tokenizers`-backed counter matched to the generation model, and a cheap
//! character heuristic used when no tokenizer file is configured.

use std::path::Path;

use tracing::warn;

use crate::constants::HEURISTIC_CHARS_PER_TOKEN;

/// Model-specific token counting.
pub trait TokenCounter: Send + Sync {
    /// Returns the number of tokens `text` occupies in the target model.
    fn count_tokens(&self, text: &str) -> usize;
}

/// Counter backed by a HuggingFace tokenizer file.
pub struct HfTokenCounter {
    tokenizer: tokenizers::Tokenizer,
}

impl std::fmt::Debug for HfTokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenCounter").finish_non_exhaustive()
    }
}

impl HfTokenCounter {
    /// Loads a tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let tokenizer = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer from {}: {e}", path.display()))?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().len(),
            Err(e) => {
                // Encoding errors are rare (malformed input); over-estimating
                // via the heuristic keeps the budget conservative.
                warn!(error = %e, "tokenizer encode failed, falling back to heuristic count");
                heuristic_count(text)
            }
        }
    }
}

/// Characters-per-token approximation, used when no tokenizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        heuristic_count(text)
    }
}

fn heuristic_count(text: &str) -> usize {
    text.chars().count().div_ceil(HEURISTIC_CHARS_PER_TOKEN)
}

/// Counts whitespace-separated words. Predictable sizes for tests.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

#[cfg(any(test, feature = "mock"))]
impl TokenCounter for WordTokenCounter {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}
