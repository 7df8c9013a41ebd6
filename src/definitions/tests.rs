use serde_json::json;

use super::*;

fn definitions_chunk(id: &str, text: &str) -> Chunk {
    Chunk::from_raw(
        id.to_string(),
        text.to_string(),
        &json!({
            "provider": "acme",
            "document_path": "eula.pdf",
            "section_heading": "Definitions",
            "is_definitions": true,
        }),
    )
}

#[test]
fn test_insert_and_get() {
    let cache = DefinitionsCache::new(16);
    cache.insert("Licensee", "the party receiving the license");

    assert_eq!(
        cache.get("Licensee").as_deref(),
        Some("the party receiving the license")
    );
    assert_eq!(cache.get("Licensor"), None);
}

#[test]
fn test_harvest_parses_both_forms() {
    let cache = DefinitionsCache::new(16);
    let chunk = definitions_chunk(
        "def-1",
        "\"Affiliate\" means an entity under common control\n\
         Territory: the United States and Canada\n\
         This sentence defines nothing.",
    );

    let harvested = cache.harvest(&chunk);

    assert_eq!(harvested, 2);
    assert_eq!(
        cache.get("Affiliate").as_deref(),
        Some("an entity under common control")
    );
    assert_eq!(
        cache.get("Territory").as_deref(),
        Some("the United States and Canada")
    );
}

#[test]
fn test_harvest_ignores_non_definitions_chunks() {
    let cache = DefinitionsCache::new(16);
    let chunk = Chunk::from_raw(
        "body-1".to_string(),
        "Territory: the United States".to_string(),
        &json!({ "is_definitions": false }),
    );

    assert_eq!(cache.harvest(&chunk), 0);
    assert!(cache.is_empty());
}

#[test]
fn test_block_for_only_mentioned_terms() {
    let cache = DefinitionsCache::new(16);
    cache.insert("Affiliate", "an entity under common control");
    cache.insert("Territory", "the United States");
    cache.insert("Effective Date", "January 1");

    let block = cache
        .block_for(["sublicensing to an Affiliate within the Territory"])
        .unwrap();

    // Sorted by term, one line each, unmentioned terms excluded.
    assert_eq!(
        block,
        "Affiliate: an entity under common control\nTerritory: the United States"
    );
}

#[test]
fn test_block_for_no_matches_is_none() {
    let cache = DefinitionsCache::new(16);
    cache.insert("Affiliate", "an entity under common control");

    assert_eq!(cache.block_for(["payment is due quarterly"]), None);
    assert_eq!(cache.block_for([]), None);
}

#[test]
fn test_capacity_is_bounded() {
    let cache = DefinitionsCache::new(2);
    cache.insert("A", "first");
    cache.insert("B", "second");
    cache.insert("C", "third");

    assert!(cache.len() <= 2);
}

#[test]
fn test_parse_definition_line_rejects_noise() {
    assert_eq!(parse_definition_line(""), None);
    assert_eq!(parse_definition_line("no delimiter here"), None);
    assert_eq!(parse_definition_line("\"Unclosed means something"), None);
    assert_eq!(parse_definition_line("\"Term\" implies something"), None);
    assert_eq!(parse_definition_line(": empty term"), None);
    assert_eq!(parse_definition_line("Term:"), None);
}
