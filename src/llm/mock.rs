use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use super::error::LlmError;
use super::{GenerationOptions, TextGenerator};

/// Scriptable [`TextGenerator`] for tests.
///
/// Responses are selected by substring match on the user prompt, so behavior
/// stays deterministic even when calls run concurrently. The first matching
/// rule wins; unmatched prompts get the default response.
#[derive(Default)]
pub struct MockGenerator {
    rules: RwLock<Vec<MockRule>>,
    default_response: RwLock<String>,
    calls: AtomicUsize,
}

struct MockRule {
    needle: String,
    behavior: MockBehavior,
}

enum MockBehavior {
    Respond(String),
    Fail(String),
    Delay(Duration, String),
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response for prompts that match no rule.
    pub fn with_default_response(self, response: &str) -> Self {
        *self.default_response.write().expect("lock poisoned") = response.to_string();
        self
    }

    /// Responds with `response` when the user prompt contains `needle`.
    pub fn respond_when(self, needle: &str, response: &str) -> Self {
        self.push_rule(needle, MockBehavior::Respond(response.to_string()));
        self
    }

    /// Fails with a generation error when the user prompt contains `needle`.
    pub fn fail_when(self, needle: &str, message: &str) -> Self {
        self.push_rule(needle, MockBehavior::Fail(message.to_string()));
        self
    }

    /// Sleeps for `delay` before responding when the user prompt contains
    /// `needle`. Useful for exercising caller-side timeouts.
    pub fn delay_when(self, needle: &str, delay: Duration, response: &str) -> Self {
        self.push_rule(needle, MockBehavior::Delay(delay, response.to_string()));
        self
    }

    /// Number of `generate` calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push_rule(&self, needle: &str, behavior: MockBehavior) {
        self.rules.write().expect("lock poisoned").push(MockRule {
            needle: needle.to_string(),
            behavior,
        });
    }
}

impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _options: GenerationOptions,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let matched = {
            let rules = self.rules.read().expect("lock poisoned");
            rules.iter().find_map(|rule| {
                if user_prompt.contains(&rule.needle) {
                    Some(match &rule.behavior {
                        MockBehavior::Respond(r) => MockBehavior::Respond(r.clone()),
                        MockBehavior::Fail(m) => MockBehavior::Fail(m.clone()),
                        MockBehavior::Delay(d, r) => MockBehavior::Delay(*d, r.clone()),
                    })
                } else {
                    None
                }
            })
        };

        match matched {
            Some(MockBehavior::Respond(response)) => Ok(response),
            Some(MockBehavior::Fail(message)) => Err(LlmError::GenerationFailed { message }),
            Some(MockBehavior::Delay(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Ok(self.default_response.read().expect("lock poisoned").clone()),
        }
    }
}
