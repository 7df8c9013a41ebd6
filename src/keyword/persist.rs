//! Keyword index persistence.
//!
//! Layout:
//!
//! ```text
//! [8-byte magic][version:str][provider:str][document_count:u64]
//! [chunk_ids:[str]][documents:[str]][tokenized corpus:[[str]]]
//! ```
//!
//! Strings are u32-LE length-prefixed UTF-8; lists are u32-LE count-prefixed.
//! Integrity check on load: the chunk id, document, and tokenized-corpus list
//! lengths must all equal `document_count`.
//!
//! Loading fails closed: a missing file, wrong magic, or failed integrity
//! check all surface as [`KeywordError::NotFound`] so a corrupted or
//! foreign-format index can never silently serve wrong results. A version
//! mismatch is a warning only; loading proceeds.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::{KeywordError, KeywordResult};
use super::KeywordIndex;

/// Fixed 8-byte prefix identifying the index file format.
pub const KEYWORD_INDEX_MAGIC: [u8; 8] = *b"COVKWIDX";

/// Current format version string.
pub const KEYWORD_INDEX_VERSION: &str = "1";

const INDEX_EXTENSION: &str = "kwidx";

const TEMP_EXTENSION: &str = "kwidx.tmp";

/// Returns the index file path for `provider` under `dir`.
pub fn index_path(dir: &Path, provider: &str) -> PathBuf {
    dir.join(format!("{}.{}", provider, INDEX_EXTENSION))
}

impl KeywordIndex {
    /// Persists the full index state (including the tokenized corpus) under `dir`.
    ///
    /// The write is atomic: a temp file is written, fsynced, then renamed
    /// over the final path.
    pub fn save(&self, dir: &Path) -> KeywordResult<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&KEYWORD_INDEX_MAGIC);
        write_string(&mut bytes, KEYWORD_INDEX_VERSION);
        write_string(&mut bytes, self.provider());
        bytes.extend_from_slice(&(self.chunk_ids.len() as u64).to_le_bytes());
        write_string_list(&mut bytes, &self.chunk_ids);
        write_string_list(&mut bytes, &self.documents);

        let tokenized: Vec<Vec<String>> = if self.tokenized.len() == self.documents.len() {
            self.tokenized.clone()
        } else {
            self.documents.iter().map(|d| super::tokenize(d)).collect()
        };
        write_u32(&mut bytes, tokenized.len() as u32);
        for tokens in &tokenized {
            write_string_list(&mut bytes, tokens);
        }

        let temp_path = dir.join(format!("{}.{}", self.provider(), TEMP_EXTENSION));
        let final_path = index_path(dir, self.provider());

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &final_path)?;

        debug!(
            path = %final_path.display(),
            documents = self.chunk_ids.len(),
            bytes = bytes.len(),
            "keyword index saved"
        );

        Ok(())
    }

    /// Restores a saved index for `provider` from `dir` and finalizes it for
    /// querying.
    pub fn load(dir: &Path, provider: &str) -> KeywordResult<Self> {
        let path = index_path(dir, provider);

        let not_found = || KeywordError::NotFound {
            provider: provider.to_string(),
            path: path.clone(),
        };

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "keyword index file unreadable");
                return Err(not_found());
            }
        };

        let mut cursor = Cursor::new(&bytes);

        match cursor.take(KEYWORD_INDEX_MAGIC.len()) {
            Some(magic) if magic == KEYWORD_INDEX_MAGIC => {}
            _ => {
                warn!(path = %path.display(), "keyword index has wrong magic, refusing to load");
                return Err(not_found());
            }
        }

        let parsed = (|| -> Option<KeywordIndex> {
            let version = cursor.read_string()?;
            if version != KEYWORD_INDEX_VERSION {
                warn!(
                    found = %version,
                    expected = KEYWORD_INDEX_VERSION,
                    "keyword index version mismatch, loading anyway"
                );
            }

            let stored_provider = cursor.read_string()?;
            let document_count = cursor.read_u64()?;
            let chunk_ids = cursor.read_string_list()?;
            let documents = cursor.read_string_list()?;

            let tokenized_count = cursor.read_u32()? as usize;
            let mut tokenized = Vec::with_capacity(tokenized_count);
            for _ in 0..tokenized_count {
                tokenized.push(cursor.read_string_list()?);
            }

            // All three lists must agree with the stored count. A surplus
            // tokenized document would otherwise produce postings pointing
            // past the chunk id table.
            if chunk_ids.len() as u64 != document_count
                || documents.len() as u64 != document_count
                || tokenized.len() as u64 != document_count
            {
                warn!(
                    document_count,
                    chunk_ids = chunk_ids.len(),
                    documents = documents.len(),
                    tokenized = tokenized.len(),
                    "keyword index integrity check failed"
                );
                return None;
            }

            Some(KeywordIndex {
                provider: stored_provider,
                chunk_ids,
                documents,
                tokenized,
                stats: None,
            })
        })();

        let Some(mut index) = parsed else {
            warn!(path = %path.display(), "keyword index payload corrupt, refusing to load");
            return Err(not_found());
        };

        index.compute_stats();

        debug!(
            path = %path.display(),
            documents = index.len(),
            "keyword index loaded"
        );

        Ok(index)
    }
}

fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    write_u32(out, s.len() as u32);
    out.extend_from_slice(s.as_bytes());
}

fn write_string_list(out: &mut Vec<u8>, items: &[String]) {
    write_u32(out, items.len() as u32);
    for item in items {
        write_string(out, item);
    }
}

/// Bounds-checked reader over the raw index bytes. Any short read yields
/// `None`, which the caller treats as corruption.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        if end > self.bytes.len() {
            return None;
        }
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Some(slice)
    }

    fn read_u32(&mut self) -> Option<u32> {
        let raw = self.take(4)?;
        Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_u64(&mut self) -> Option<u64> {
        let raw = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Some(u64::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).ok()
    }

    fn read_string_list(&mut self) -> Option<Vec<String>> {
        let count = self.read_u32()? as usize;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(self.read_string()?);
        }
        Some(items)
    }
}
