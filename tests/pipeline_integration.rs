//! End-to-end pipeline tests over the mock collaborators.

use serde_json::json;

use covenant::{
    BudgetMode, ContextBudgeter, DefinitionsCache, GateDecision, HybridSearcher, KeywordIndex,
    MockGenerator, MockVectorStore, QueryPipeline, RefusalReason, Reranker, RerankerConfig,
    ResultSource, SearchMode, WordTokenCounter,
};

const CORPUS: &[(&str, &str, &str)] = &[
    (
        "term-1",
        "Either party may terminate this agreement upon ninety days written notice.",
        "Termination",
    ),
    (
        "fees-1",
        "License fees are payable quarterly in advance, net thirty days from invoice.",
        "Fees",
    ),
    (
        "sub-1",
        "The Licensee may sublicense its rights to an Affiliate without prior consent.",
        "Sublicensing",
    ),
];

fn metadata(section: &str) -> serde_json::Value {
    json!({
        "provider": "acme",
        "document_path": "licenses/master-agreement.pdf",
        "section_heading": section,
        "page_start": 1,
        "page_end": 2,
        "is_definitions": false,
    })
}

fn corpus_store() -> MockVectorStore {
    let store = MockVectorStore::new();
    for (i, (id, text, section)) in CORPUS.iter().enumerate() {
        store.insert(id, text, metadata(section), 0.1 + 0.1 * i as f64);
    }
    store
}

fn corpus_index() -> KeywordIndex {
    let mut index = KeywordIndex::new("acme");
    let ids: Vec<String> = CORPUS.iter().map(|(id, _, _)| id.to_string()).collect();
    let texts: Vec<String> = CORPUS.iter().map(|(_, text, _)| text.to_string()).collect();
    index.add(&ids, &texts).unwrap();
    index.build();
    index
}

fn budgeter() -> ContextBudgeter<WordTokenCounter> {
    ContextBudgeter::with_limits(WordTokenCounter, 1_000, BudgetMode::FullPrompt)
}

#[tokio::test]
async fn test_hybrid_end_to_end_answer() {
    let generator = MockGenerator::new()
        .respond_when("ninety days", "Score: 3\nExplanation: states the notice period")
        .with_default_response("Score: 0");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), Some(corpus_index())),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search(
            "how much notice before termination?",
            SearchMode::Hybrid,
            3,
        )
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks.len(), 1);
    assert_eq!(outcome.final_chunks[0].chunk_id, "term-1");
    assert_eq!(outcome.final_chunks[0].source, ResultSource::Hybrid);
    assert_eq!(outcome.final_chunks[0].metadata.provider, "acme");

    let budget = outcome.budget.unwrap();
    assert!(budget.under_budget);
    assert_eq!(budget.original_count, 1);
}

#[tokio::test]
async fn test_unanswerable_question_refused() {
    let generator = MockGenerator::new().with_default_response("Score: 0");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), Some(corpus_index())),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("what is the warranty on the hardware?", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(
        outcome.decision,
        GateDecision::Refuse(RefusalReason::AllChunksBelowThreshold)
    );
    assert!(outcome.final_chunks.is_empty());
    assert!(outcome.budget.is_none());
}

#[tokio::test]
async fn test_empty_corpus_refuses_with_no_chunks() {
    let pipeline = QueryPipeline::new(
        HybridSearcher::new(MockVectorStore::new(), None),
        Some(Reranker::new(
            MockGenerator::new().with_default_response("Score: 3"),
        )),
        budgeter(),
    );

    let outcome = pipeline
        .search("anything at all", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(
        outcome.decision,
        GateDecision::Refuse(RefusalReason::NoChunksRetrieved)
    );
}

#[tokio::test]
async fn test_scoring_failures_degrade_not_abort() {
    // Every scoring call fails; all chunks fall to the neutral score of 1 and
    // the gate refuses, but the pipeline itself succeeds.
    let generator = MockGenerator::new().fail_when("Question", "model unavailable");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), Some(corpus_index())),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("termination notice", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(
        outcome.decision,
        GateDecision::Refuse(RefusalReason::AllChunksBelowThreshold)
    );
}

#[tokio::test]
async fn test_index_round_trip_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    corpus_index().save(dir.path()).unwrap();
    let loaded = KeywordIndex::load(dir.path(), "acme").unwrap();

    let generator = MockGenerator::new()
        .respond_when("sublicense", "Score: 3")
        .with_default_response("Score: 0");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), Some(loaded)),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("can rights be sublicensed to an affiliate?", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks[0].chunk_id, "sub-1");
}

#[tokio::test]
async fn test_missing_index_falls_back_and_still_answers() {
    // No keyword index at all: hybrid falls back to vector-only retrieval.
    let generator = MockGenerator::new()
        .respond_when("ninety days", "Score: 3")
        .with_default_response("Score: 0");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), None),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("notice before termination", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks[0].chunk_id, "term-1");
    assert_eq!(outcome.final_chunks[0].source, ResultSource::Vector);
}

#[tokio::test]
async fn test_definitions_and_tight_budget_drop_weakest() {
    let definitions = DefinitionsCache::new(16);
    definitions.insert("Affiliate", "an entity controlling or controlled by a party");

    let generator = MockGenerator::new()
        .respond_when("sublicense", "Score: 3")
        .with_default_response("Score: 2");

    // Ceiling sized so the prompt fits without the definitions block but
    // needs one drop once the block is counted.
    let tight = ContextBudgeter::with_limits(WordTokenCounter, 90, BudgetMode::FullPrompt);

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(corpus_store(), Some(corpus_index())),
        Some(Reranker::new(generator)),
        tight,
    )
    .with_definitions(definitions);

    let outcome = pipeline
        .search("may the Licensee sublicense to an Affiliate?", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    let budget = outcome.budget.unwrap();
    assert!(budget.under_budget);
    assert_eq!(budget.dropped_count, 1);
    assert!(outcome
        .final_chunks
        .iter()
        .any(|c| c.chunk_id == "sub-1"));
}

#[tokio::test]
async fn test_outcomes_identical_across_runs() {
    let build = || {
        let generator = MockGenerator::new()
            .respond_when("ninety days", "Score: 3")
            .respond_when("fees", "Score: 2")
            .with_default_response("Score: 1");
        QueryPipeline::new(
            HybridSearcher::new(corpus_store(), Some(corpus_index())),
            Some(Reranker::with_config(
                generator,
                RerankerConfig {
                    concurrency: 2,
                    ..Default::default()
                },
            )),
            budgeter(),
        )
    };

    let a = build()
        .search("termination and fees", SearchMode::Hybrid, 3)
        .await
        .unwrap();
    let b = build()
        .search("termination and fees", SearchMode::Hybrid, 3)
        .await
        .unwrap();

    assert_eq!(a.decision, b.decision);
    let ids_a: Vec<&str> = a.final_chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    let ids_b: Vec<&str> = b.final_chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids_a, ids_b);
}
