//! Prompt assembly for the downstream generation call.
//!
//! The exact wording is not a contract; the fixed shape is. Full-prompt
//! budgeting measures the rendered output of this template, so everything
//! that will reach the generation model must flow through [`PromptTemplate::render`].

use crate::rerank::ScoredChunk;

const DEFAULT_SYSTEM_TEXT: &str = "\
You answer questions about software licensing agreements using only the \
provided excerpts. Cite the document and section for every claim. If the \
excerpts do not contain the answer, say so.";

/// Renders the final generation prompt from its parts.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system_text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            system_text: DEFAULT_SYSTEM_TEXT.to_string(),
        }
    }
}

impl PromptTemplate {
    /// Creates a template with custom system text.
    pub fn new(system_text: impl Into<String>) -> Self {
        Self {
            system_text: system_text.into(),
        }
    }

    /// Formats one chunk the way it appears in the final prompt.
    pub fn format_chunk(&self, chunk: &ScoredChunk) -> String {
        format!("[{}]\n{}", chunk.metadata.citation(), chunk.text)
    }

    /// Builds the complete prompt text: system text, question, optional
    /// definitions block, and the formatted chunks.
    pub fn render(
        &self,
        question: &str,
        definitions_block: Option<&str>,
        chunks: &[ScoredChunk],
    ) -> String {
        let mut prompt = String::with_capacity(
            self.system_text.len() + question.len() + chunks.iter().map(|c| c.text.len() + 64).sum::<usize>(),
        );

        prompt.push_str(&self.system_text);
        prompt.push_str("\n\nQuestion: ");
        prompt.push_str(question);

        if let Some(definitions) = definitions_block {
            prompt.push_str("\n\nDefined terms:\n");
            prompt.push_str(definitions);
        }

        prompt.push_str("\n\nExcerpts:\n");
        for chunk in chunks {
            prompt.push_str("\n---\n");
            prompt.push_str(&self.format_chunk(chunk));
        }

        prompt
    }
}
