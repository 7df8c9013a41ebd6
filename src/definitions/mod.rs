//! Bounded cache of defined terms.
//!
//! Licensing agreements front-load a definitions section; answers elsewhere
//! in the document lean on those terms. The cache maps a defined term to its
//! definition text, harvested from chunks flagged `is_definitions` at index
//! time or inserted directly. At query time it emits an optional block of
//! the cached definitions that the retrieved text actually mentions, which
//! the budgeter appends to the prompt.
//!
//! The cache is an explicit object constructed once at startup and injected
//! into the pipeline, with a fixed LRU capacity. No process-wide state.

#[cfg(test)]
mod tests;

use moka::sync::Cache;
use tracing::debug;

use crate::constants::DEFAULT_DEFINITIONS_CACHE_CAPACITY;
use crate::corpus::Chunk;

/// LRU store of `term -> definition` pairs.
pub struct DefinitionsCache {
    cache: Cache<String, String>,
}

impl std::fmt::Debug for DefinitionsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionsCache")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl Default for DefinitionsCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEFINITIONS_CACHE_CAPACITY)
    }
}

impl DefinitionsCache {
    /// Creates a cache bounded to `capacity` terms.
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Inserts or replaces one term.
    pub fn insert(&self, term: impl Into<String>, definition: impl Into<String>) {
        self.cache.insert(term.into(), definition.into());
    }

    /// Looks up one term.
    pub fn get(&self, term: &str) -> Option<String> {
        self.cache.get(term)
    }

    /// Number of cached terms.
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Harvests `Term: definition` and `"Term" means definition` lines from a
    /// definitions chunk. Non-definitions chunks are ignored.
    pub fn harvest(&self, chunk: &Chunk) -> usize {
        if !chunk.metadata.is_definitions {
            return 0;
        }

        let mut harvested = 0;
        for line in chunk.text.lines() {
            if let Some((term, definition)) = parse_definition_line(line) {
                self.insert(term, definition);
                harvested += 1;
            }
        }

        if harvested > 0 {
            debug!(chunk_id = %chunk.id, harvested, "definitions harvested");
        }

        harvested
    }

    /// Builds the definitions block for the given retrieved texts: one
    /// `Term: definition` line per cached term some text mentions, sorted by
    /// term. Returns `None` when nothing matches.
    pub fn block_for<'a>(&self, texts: impl IntoIterator<Item = &'a str>) -> Option<String> {
        let texts: Vec<&str> = texts.into_iter().collect();
        if texts.is_empty() {
            return None;
        }

        let mut matched: Vec<(String, String)> = self
            .cache
            .iter()
            .filter(|(term, _)| texts.iter().any(|text| text.contains(term.as_str())))
            .map(|(term, definition)| (term.to_string(), definition))
            .collect();

        if matched.is_empty() {
            return None;
        }

        // Cache iteration order is unspecified; sort for a deterministic block.
        matched.sort();

        let block = matched
            .into_iter()
            .map(|(term, definition)| format!("{term}: {definition}"))
            .collect::<Vec<_>>()
            .join("\n");

        Some(block)
    }
}

/// Parses one definition line. Accepted forms:
/// `"Term" means definition text` and `Term: definition text`.
fn parse_definition_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix('"') {
        let (term, after) = rest.split_once('"')?;
        let definition = after.trim().strip_prefix("means")?.trim();
        if term.is_empty() || definition.is_empty() {
            return None;
        }
        return Some((term.to_string(), definition.to_string()));
    }

    let (term, definition) = line.split_once(':')?;
    let term = term.trim();
    let definition = definition.trim();
    // A colon mid-sentence is not a definition; real terms are short.
    if term.is_empty() || definition.is_empty() || term.len() > 64 {
        return None;
    }
    Some((term.to_string(), definition.to_string()))
}
