use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by generation adapters.
pub enum LlmError {
    /// The provider call failed.
    #[error("generation call failed: {message}")]
    GenerationFailed {
        /// Error message from the provider.
        message: String,
    },

    /// The provider returned a response with no text content.
    #[error("generation returned no text content")]
    EmptyResponse,
}
