//! Corpus chunk types.
//!
//! Chunks are produced by an out-of-process extraction/ingestion step and are
//! immutable at query time. The pipeline never mutates them; it only copies
//! their fields into per-query result records.
//!
//! Metadata arriving from the vector store is loosely typed JSON. It is
//! normalized into [`ChunkMetadata`] here, at the corpus-read boundary, so no
//! map-shaped records travel through the pipeline. Missing fields default to
//! empty/zero; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed metadata attached to every corpus chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Licensing provider / document source the chunk belongs to.
    pub provider: String,
    /// Path of the source document within the provider's corpus.
    pub document_path: String,
    /// Section heading the chunk was extracted under.
    pub section_heading: String,
    /// First page the chunk spans (1-based, 0 when unknown).
    pub page_start: u32,
    /// Last page the chunk spans (1-based, 0 when unknown).
    pub page_end: u32,
    /// `true` for chunks extracted from a definitions section.
    pub is_definitions: bool,
}

impl ChunkMetadata {
    /// Normalizes a loosely-typed JSON metadata record.
    ///
    /// Non-object values produce default metadata; individual fields fall back
    /// to defaults when missing or of the wrong type.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let str_field = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let page_field = |key: &str| {
            map.get(key)
                .and_then(Value::as_u64)
                .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
                .unwrap_or(0)
        };

        Self {
            provider: str_field("provider"),
            document_path: str_field("document_path"),
            section_heading: str_field("section_heading"),
            page_start: page_field("page_start"),
            page_end: page_field("page_end"),
            is_definitions: map
                .get("is_definitions")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Returns a short human-readable citation, e.g. `doc.pdf §Grant of License pp. 3-4`.
    pub fn citation(&self) -> String {
        let mut out = self.document_path.clone();
        if !self.section_heading.is_empty() {
            out.push_str(&format!(" §{}", self.section_heading));
        }
        if self.page_start > 0 {
            if self.page_end > self.page_start {
                out.push_str(&format!(" pp. {}-{}", self.page_start, self.page_end));
            } else {
                out.push_str(&format!(" p. {}", self.page_start));
            }
        }
        out
    }
}

/// An immutable corpus chunk (created at ingestion, read-only here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique, stable chunk identifier.
    pub id: String,
    /// Extracted chunk text.
    pub text: String,
    /// Normalized metadata.
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Creates a chunk from raw corpus fields, normalizing metadata JSON.
    pub fn from_raw(id: String, text: String, metadata: &Value) -> Self {
        Self {
            id,
            text,
            metadata: ChunkMetadata::from_value(metadata),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_from_full_object() {
        let value = json!({
            "provider": "acme",
            "document_path": "licenses/eula.pdf",
            "section_heading": "Grant of License",
            "page_start": 3,
            "page_end": 4,
            "is_definitions": true,
        });

        let meta = ChunkMetadata::from_value(&value);
        assert_eq!(meta.provider, "acme");
        assert_eq!(meta.document_path, "licenses/eula.pdf");
        assert_eq!(meta.section_heading, "Grant of License");
        assert_eq!(meta.page_start, 3);
        assert_eq!(meta.page_end, 4);
        assert!(meta.is_definitions);
    }

    #[test]
    fn test_metadata_missing_fields_default() {
        let meta = ChunkMetadata::from_value(&json!({ "provider": "acme" }));
        assert_eq!(meta.provider, "acme");
        assert_eq!(meta.document_path, "");
        assert_eq!(meta.page_start, 0);
        assert!(!meta.is_definitions);
    }

    #[test]
    fn test_metadata_wrong_types_default() {
        let value = json!({
            "provider": 42,
            "page_start": "three",
            "is_definitions": "yes",
        });

        let meta = ChunkMetadata::from_value(&value);
        assert_eq!(meta.provider, "");
        assert_eq!(meta.page_start, 0);
        assert!(!meta.is_definitions);
    }

    #[test]
    fn test_metadata_non_object_defaults() {
        assert_eq!(
            ChunkMetadata::from_value(&Value::Null),
            ChunkMetadata::default()
        );
    }

    #[test]
    fn test_citation_formats() {
        let mut meta = ChunkMetadata {
            document_path: "eula.pdf".into(),
            section_heading: "Term".into(),
            page_start: 3,
            page_end: 4,
            ..Default::default()
        };
        assert_eq!(meta.citation(), "eula.pdf §Term pp. 3-4");

        meta.page_end = 3;
        assert_eq!(meta.citation(), "eula.pdf §Term p. 3");

        meta.page_start = 0;
        meta.section_heading.clear();
        assert_eq!(meta.citation(), "eula.pdf");
    }
}
