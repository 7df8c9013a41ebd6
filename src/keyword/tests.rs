use super::persist::{index_path, KEYWORD_INDEX_MAGIC, KEYWORD_INDEX_VERSION};
use super::*;

fn sample_index() -> KeywordIndex {
    let mut index = KeywordIndex::new("acme");
    index
        .add(
            &[
                "chunk-1".to_string(),
                "chunk-2".to_string(),
                "chunk-3".to_string(),
            ],
            &[
                "The licensee may sublicense the software to affiliates.".to_string(),
                "Termination of this agreement requires ninety days notice.".to_string(),
                "Fees are payable quarterly in arrears.".to_string(),
            ],
        )
        .unwrap();
    index.build();
    index
}

#[test]
fn test_tokenize_lowercases_and_splits() {
    let tokens = tokenize("The Licensee MAY sub-license; v2!");
    assert_eq!(tokens, vec!["the", "licensee", "may", "sub", "license", "v2"]);
}

#[test]
fn test_tokenize_drops_short_tokens() {
    let tokens = tokenize("a b cd");
    assert_eq!(tokens, vec!["cd"]);
}

#[test]
fn test_add_size_mismatch_fails_fast() {
    let mut index = KeywordIndex::new("acme");
    let err = index
        .add(&["one".to_string()], &[])
        .expect_err("mismatched lengths must fail");
    assert!(matches!(err, KeywordError::SizeMismatch { ids: 1, texts: 0 }));
}

#[test]
fn test_query_before_build_fails() {
    let mut index = KeywordIndex::new("acme");
    index
        .add(&["c1".to_string()], &["some text".to_string()])
        .unwrap();
    let err = index.query("text", 5).expect_err("unbuilt index");
    assert!(matches!(err, KeywordError::NotBuilt));
}

#[test]
fn test_build_on_empty_corpus_is_noop_scorer() {
    let mut index = KeywordIndex::new("acme");
    index.build();
    assert!(index.is_built());
    assert!(index.query("anything", 5).unwrap().is_empty());
}

#[test]
fn test_query_ranks_matching_document_first() {
    let index = sample_index();
    let hits = index
        .query("ninety days notice before termination", 3)
        .unwrap();

    assert!(!hits.is_empty());
    assert_eq!(hits[0].0, "chunk-2");
    for (_, score) in &hits {
        assert!(*score > 0.0);
    }
}

#[test]
fn test_query_scores_descending_and_truncated() {
    let index = sample_index();
    let hits = index.query("software agreement fees", 2).unwrap();

    assert!(hits.len() <= 2);
    for pair in hits.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
}

#[test]
fn test_query_no_match_returns_empty() {
    let index = sample_index();
    assert!(index.query("zebra xylophone", 5).unwrap().is_empty());
}

#[test]
fn test_add_invalidates_built_stats() {
    let mut index = sample_index();
    index
        .add(&["c4".to_string()], &["more text".to_string()])
        .unwrap();
    assert!(!index.is_built());
}

#[test]
fn test_document_text_lookup() {
    let index = sample_index();
    assert!(index.document_text("chunk-3").unwrap().contains("quarterly"));
    assert!(index.document_text("missing").is_none());
}

#[test]
fn test_save_load_round_trip_preserves_query_results() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();

    let before = index.query("terminate the agreement", 3).unwrap();
    index.save(dir.path()).unwrap();

    let loaded = KeywordIndex::load(dir.path(), "acme").unwrap();
    let after = loaded.query("terminate the agreement", 3).unwrap();

    assert_eq!(loaded.len(), index.len());
    assert_eq!(before.len(), after.len());
    for ((id_a, score_a), (id_b, score_b)) in before.iter().zip(after.iter()) {
        assert_eq!(id_a, id_b);
        assert!((score_a - score_b).abs() < 1e-12);
    }
}

#[test]
fn test_load_missing_file_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let err = KeywordIndex::load(dir.path(), "acme").expect_err("no file");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

#[test]
fn test_load_wrong_magic_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(index_path(dir.path(), "acme"), b"NOTMAGIC-rest-of-file").unwrap();

    let err = KeywordIndex::load(dir.path(), "acme").expect_err("foreign format");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

#[test]
fn test_load_truncated_payload_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&KEYWORD_INDEX_MAGIC);
    bytes.extend_from_slice(&[1, 0, 0]); // short length prefix
    std::fs::write(index_path(dir.path(), "acme"), bytes).unwrap();

    let err = KeywordIndex::load(dir.path(), "acme").expect_err("truncated payload");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

#[test]
fn test_load_count_mismatch_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();
    index.save(dir.path()).unwrap();

    // Corrupt the document_count field in place. It sits right after the
    // magic, version string, and provider string.
    let path = index_path(dir.path(), "acme");
    let mut bytes = std::fs::read(&path).unwrap();
    let count_offset = 8 + 4 + "1".len() + 4 + "acme".len();
    bytes[count_offset..count_offset + 8].copy_from_slice(&99u64.to_le_bytes());
    std::fs::write(&path, bytes).unwrap();

    let err = KeywordIndex::load(dir.path(), "acme").expect_err("count mismatch");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

fn push_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

#[test]
fn test_load_surplus_tokenized_docs_fails_closed() {
    // One chunk id and document, but two tokenized documents. The surplus
    // document would otherwise feed postings with an out-of-range index.
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&KEYWORD_INDEX_MAGIC);
    push_str(&mut bytes, KEYWORD_INDEX_VERSION);
    push_str(&mut bytes, "acme");
    bytes.extend_from_slice(&1u64.to_le_bytes()); // document_count
    bytes.extend_from_slice(&1u32.to_le_bytes());
    push_str(&mut bytes, "chunk-1");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    push_str(&mut bytes, "licensee fees");
    bytes.extend_from_slice(&2u32.to_le_bytes()); // tokenized corpus
    bytes.extend_from_slice(&2u32.to_le_bytes());
    push_str(&mut bytes, "licensee");
    push_str(&mut bytes, "fees");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    push_str(&mut bytes, "zebra");
    std::fs::write(index_path(dir.path(), "acme"), bytes).unwrap();

    let err = KeywordIndex::load(dir.path(), "acme").expect_err("surplus tokenized docs");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

#[test]
fn test_load_missing_document_text_fails_closed() {
    // document_count and chunk ids agree, but the document list is empty.
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&KEYWORD_INDEX_MAGIC);
    push_str(&mut bytes, KEYWORD_INDEX_VERSION);
    push_str(&mut bytes, "acme");
    bytes.extend_from_slice(&1u64.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    push_str(&mut bytes, "chunk-1");
    bytes.extend_from_slice(&0u32.to_le_bytes()); // no documents
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    push_str(&mut bytes, "fees");
    std::fs::write(index_path(dir.path(), "acme"), bytes).unwrap();

    let err = KeywordIndex::load(dir.path(), "acme").expect_err("document list too short");
    assert!(matches!(err, KeywordError::NotFound { .. }));
}

#[test]
fn test_load_tolerates_version_drift() {
    let dir = tempfile::tempdir().unwrap();
    let index = sample_index();
    let before = index.query("sublicense the software", 3).unwrap();
    index.save(dir.path()).unwrap();

    // The version string sits right after the 8-byte magic and its own u32
    // length prefix.
    let path = index_path(dir.path(), "acme");
    let mut bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[12], KEYWORD_INDEX_VERSION.as_bytes()[0]);
    bytes[12] = b'9';
    std::fs::write(&path, bytes).unwrap();

    let loaded = KeywordIndex::load(dir.path(), "acme").expect("version drift is not fatal");
    let after = loaded.query("sublicense the software", 3).unwrap();

    assert_eq!(before.len(), after.len());
    for ((id_a, score_a), (id_b, score_b)) in before.iter().zip(after.iter()) {
        assert_eq!(id_a, id_b);
        assert!((score_a - score_b).abs() < 1e-12);
    }
}

#[test]
fn test_empty_corpus_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut index = KeywordIndex::new("empty");
    index.build();
    index.save(dir.path()).unwrap();

    let loaded = KeywordIndex::load(dir.path(), "empty").unwrap();
    assert!(loaded.is_empty());
    assert!(loaded.query("anything", 5).unwrap().is_empty());
}
