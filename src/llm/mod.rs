//! Generation/scoring model collaborator.
//!
//! Both the reranker (temperature 0) and the out-of-scope final answer step
//! consume the model through the narrow [`TextGenerator`] trait. Timeouts are
//! the caller's responsibility (`tokio::time::timeout` around `generate`), so
//! adapters stay simple.

pub mod error;
pub mod genai;
pub mod mock;

pub use error::LlmError;
pub use genai::GenaiGenerator;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerator;

/// Options for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    /// Maximum completion tokens.
    pub max_tokens: u32,
    /// Sampling temperature. The reranker always uses `0.0`.
    pub temperature: f64,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.0,
        }
    }
}

/// Minimal async interface to the text generation collaborator.
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for the given system and user prompts.
    fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
