//! Persisted BM25 keyword index over chunk text.
//!
//! Documents are accumulated with [`KeywordIndex::add`], finalized with
//! [`KeywordIndex::build`], and queried with [`KeywordIndex::query`]. The
//! whole index (including the tokenized corpus) can be saved to and restored
//! from a versioned binary file; see [`persist`] for the format and its
//! fail-closed loading rules.
//!
//! The index is read-only at query time. Writes happen only during a
//! separate, non-concurrent ingestion phase.

pub mod error;
pub mod persist;

#[cfg(test)]
mod tests;

pub use error::{KeywordError, KeywordResult};

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{BM25_B, BM25_K1, MIN_TOKEN_LEN};

/// Tokenizes text for keyword indexing and querying.
///
/// Lowercases, splits on non-alphanumeric characters, and drops tokens shorter
/// than [`MIN_TOKEN_LEN`] characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}

/// Finalized BM25 statistics over the tokenized corpus.
#[derive(Debug, Clone)]
struct Bm25Stats {
    /// term -> (document index, term frequency) postings.
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
}

/// BM25 keyword scorer over accumulated chunk documents.
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    provider: String,
    chunk_ids: Vec<String>,
    documents: Vec<String>,
    tokenized: Vec<Vec<String>>,
    stats: Option<Bm25Stats>,
}

impl KeywordIndex {
    /// Creates an empty index for `provider`.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            chunk_ids: Vec::new(),
            documents: Vec::new(),
            tokenized: Vec::new(),
            stats: None,
        }
    }

    /// Returns the provider this index belongs to.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the number of accumulated documents.
    pub fn len(&self) -> usize {
        self.chunk_ids.len()
    }

    /// Returns `true` if no documents have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.chunk_ids.is_empty()
    }

    /// Returns `true` once `build` has finalized the scorer.
    pub fn is_built(&self) -> bool {
        self.stats.is_some()
    }

    /// Returns the raw text of the document with `chunk_id`, if indexed.
    pub fn document_text(&self, chunk_id: &str) -> Option<&str> {
        self.chunk_ids
            .iter()
            .position(|id| id == chunk_id)
            .map(|idx| self.documents[idx].as_str())
    }

    /// Accumulates documents. Inputs must be equal length.
    ///
    /// Invalidates any previously built statistics; call `build` again before
    /// querying.
    pub fn add(&mut self, chunk_ids: &[String], texts: &[String]) -> KeywordResult<()> {
        if chunk_ids.len() != texts.len() {
            return Err(KeywordError::SizeMismatch {
                ids: chunk_ids.len(),
                texts: texts.len(),
            });
        }

        self.chunk_ids.extend_from_slice(chunk_ids);
        self.documents.extend_from_slice(texts);
        self.stats = None;
        Ok(())
    }

    /// Finalizes the BM25 scorer from all accumulated documents.
    ///
    /// Must be called before `query`. With no documents this produces a valid
    /// scorer that returns empty results.
    pub fn build(&mut self) {
        if self.tokenized.len() != self.documents.len() {
            self.tokenized = self.documents.iter().map(|d| tokenize(d)).collect();
        }
        self.compute_stats();

        debug!(
            provider = %self.provider,
            documents = self.chunk_ids.len(),
            "keyword index built"
        );
    }

    /// Recomputes BM25 statistics from the current tokenized corpus.
    fn compute_stats(&mut self) {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lens = Vec::with_capacity(self.tokenized.len());

        for (doc_idx, tokens) in self.tokenized.iter().enumerate() {
            doc_lens.push(tokens.len());

            let mut tf: HashMap<&str, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token.as_str()).or_default() += 1;
            }
            for (term, count) in tf {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push((doc_idx, count));
            }
        }

        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / doc_lens.len() as f64
        };

        self.stats = Some(Bm25Stats {
            postings,
            doc_lens,
            avg_doc_len,
        });
    }

    /// Scores the corpus against `text` and returns up to `top_k`
    /// `(chunk_id, score)` pairs, descending, positive scores only.
    pub fn query(&self, text: &str, top_k: usize) -> KeywordResult<Vec<(String, f64)>> {
        let stats = self.stats.as_ref().ok_or(KeywordError::NotBuilt)?;

        let terms = tokenize(text);
        if terms.is_empty() || self.chunk_ids.is_empty() {
            return Ok(Vec::new());
        }

        let doc_count = self.chunk_ids.len() as f64;
        let mut scores = vec![0.0f64; self.chunk_ids.len()];

        for term in &terms {
            let Some(posting) = stats.postings.get(term) else {
                continue;
            };

            let df = posting.len() as f64;
            let idf = ((doc_count - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(doc_idx, tf) in posting {
                let tf = tf as f64;
                let len_norm = 1.0 - BM25_B
                    + BM25_B * stats.doc_lens[doc_idx] as f64 / stats.avg_doc_len.max(1e-9);
                scores[doc_idx] += idf * tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * len_norm);
            }
        }

        let mut hits: Vec<(String, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .map(|(idx, score)| (self.chunk_ids[idx].clone(), score))
            .collect();

        // Stable sort keeps corpus order on ties, so results are deterministic.
        hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);

        Ok(hits)
    }
}
