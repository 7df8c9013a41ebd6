//! genai-backed [`TextGenerator`] adapter.

use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use genai::Client;
use tracing::debug;

use super::error::LlmError;
use super::{GenerationOptions, TextGenerator};

/// Text generator over a genai [`Client`], bound to one model name.
#[derive(Clone)]
pub struct GenaiGenerator {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenaiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenaiGenerator {
    /// Creates a generator for `model` with a default genai client
    /// (provider credentials come from the environment).
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }

    /// Creates a generator over an existing client.
    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for GenaiGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, LlmError> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ]);

        let chat_options = ChatOptions::default()
            .with_temperature(options.temperature)
            .with_max_tokens(options.max_tokens);

        debug!(
            model = %self.model,
            user_prompt_len = user_prompt.len(),
            max_tokens = options.max_tokens,
            "dispatching generation call"
        );

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&chat_options))
            .await
            .map_err(|e| LlmError::GenerationFailed {
                message: e.to_string(),
            })?;

        response
            .first_text()
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }
}
