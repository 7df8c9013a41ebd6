use serde_json::json;

use super::*;
use crate::budget::BudgetMode;
use crate::gate::RefusalReason;
use crate::llm::MockGenerator;
use crate::tokenize::WordTokenCounter;
use crate::vectordb::MockVectorStore;

fn meta() -> serde_json::Value {
    json!({
        "provider": "acme",
        "document_path": "eula.pdf",
        "section_heading": "Term",
        "page_start": 2,
        "page_end": 2,
        "is_definitions": false,
    })
}

fn budgeter() -> ContextBudgeter<WordTokenCounter> {
    ContextBudgeter::with_limits(WordTokenCounter, 1_000, BudgetMode::FullPrompt)
}

#[tokio::test]
async fn test_reranked_path_answers() {
    let store = MockVectorStore::new();
    store.insert("A", "termination requires ninety days notice", meta(), 0.1);
    store.insert("B", "fees are payable quarterly", meta(), 0.3);

    let generator = MockGenerator::new()
        .respond_when("ninety days", "Score: 3\nExplanation: states the notice period")
        .with_default_response("Score: 1");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("what notice is required before termination?", SearchMode::Vector, 5)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks.len(), 1);
    assert_eq!(outcome.final_chunks[0].chunk_id, "A");
    assert_eq!(outcome.final_chunks[0].relevance_score, 3);

    let budget = outcome.budget.expect("budget runs after acceptance");
    assert!(budget.under_budget);
    assert_eq!(budget.kept_count, 1);
}

#[tokio::test]
async fn test_empty_retrieval_refuses_before_budgeting() {
    let store = MockVectorStore::new();
    let generator = MockGenerator::new().with_default_response("Score: 3");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("anything", SearchMode::Vector, 5)
        .await
        .unwrap();

    assert_eq!(
        outcome.decision,
        GateDecision::Refuse(RefusalReason::NoChunksRetrieved)
    );
    assert!(outcome.final_chunks.is_empty());
    assert!(outcome.budget.is_none());
}

#[tokio::test]
async fn test_all_low_relevance_refuses() {
    let store = MockVectorStore::new();
    store.insert("A", "alpha", meta(), 0.1);
    store.insert("B", "beta", meta(), 0.2);

    let generator = MockGenerator::new().with_default_response("Score: 1");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let outcome = pipeline
        .search("unrelated question", SearchMode::Vector, 5)
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
async fn test_gate_sees_dropped_chunk_scores() {
    // The only score-2 chunk is crowded out by max_chunks = 1, but the gate
    // still evaluates the full score set and accepts.
    let store = MockVectorStore::new();
    store.insert("A", "strong match text", meta(), 0.1);
    store.insert("B", "supporting context text", meta(), 0.3);

    let generator = MockGenerator::new()
        .respond_when("strong match", "Score: 3")
        .with_default_response("Score: 2");

    let reranker = Reranker::with_config(
        generator,
        crate::rerank::RerankerConfig {
            max_chunks: 1,
            ..Default::default()
        },
    );

    // min_chunks = 2 is only satisfiable because the gate sees the dropped
    // score-2 chunk too.
    let pipeline = QueryPipeline::new(HybridSearcher::new(store, None), Some(reranker), budgeter())
        .with_gates(
            crate::gate::RerankedGate {
                relevance_threshold: 2.0,
                min_chunks: 2,
            },
            crate::gate::RetrievalGate::default(),
        );

    let outcome = pipeline
        .search("question", SearchMode::Vector, 5)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks.len(), 1);
    assert_eq!(outcome.final_chunks[0].chunk_id, "A");
}

#[tokio::test]
async fn test_without_reranker_gates_on_retrieval_scores() {
    // distances 0.0 and 1.0 give scores 1.0 and 0.5; ratio 2.0 accepts.
    let store = MockVectorStore::new();
    store.insert("A", "alpha text", meta(), 0.0);
    store.insert("B", "beta text", meta(), 1.0);

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        None::<Reranker<MockGenerator>>,
        budgeter(),
    );

    let outcome = pipeline
        .search("question", SearchMode::Vector, 5)
        .await
        .unwrap();

    assert_eq!(outcome.decision, GateDecision::Answer);
    assert_eq!(outcome.final_chunks.len(), 2);
    // Skipped reranking wraps every chunk at the neutral score.
    assert!(outcome.final_chunks.iter().all(|c| c.relevance_score == 1));
}

#[tokio::test]
async fn test_without_reranker_refuses_on_flat_scores() {
    // distances 0.80 and 0.82 give ~0.556 and ~0.549; ratio ~1.01 < 1.2.
    let store = MockVectorStore::new();
    store.insert("A", "alpha text", meta(), 0.80);
    store.insert("B", "beta text", meta(), 0.82);

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        None::<Reranker<MockGenerator>>,
        budgeter(),
    );

    let outcome = pipeline
        .search("question", SearchMode::Vector, 5)
        .await
        .unwrap();

    assert_eq!(
        outcome.decision,
        GateDecision::Refuse(RefusalReason::RetrievalInsufficientRatio)
    );
    assert!(outcome.budget.is_none());
}

#[tokio::test]
async fn test_definitions_block_feeds_budget() {
    let make_store = || {
        let store = MockVectorStore::new();
        store.insert("A", "the Licensee may sublicense to an Affiliate", meta(), 0.1);
        store
    };

    let definitions = crate::definitions::DefinitionsCache::new(16);
    definitions.insert("Affiliate", "an entity under common control");

    // Same setup measured with and without the cache; the block adds tokens.
    let bare = QueryPipeline::new(
        HybridSearcher::new(make_store(), None),
        Some(Reranker::new(MockGenerator::new().with_default_response("Score: 3"))),
        budgeter(),
    );
    let with_defs = QueryPipeline::new(
        HybridSearcher::new(make_store(), None),
        Some(Reranker::new(MockGenerator::new().with_default_response("Score: 3"))),
        budgeter(),
    )
    .with_definitions(definitions);

    let q = "can the licensee sublicense?";
    let bare_tokens = bare
        .search(q, SearchMode::Vector, 5)
        .await
        .unwrap()
        .budget
        .unwrap()
        .total_tokens;
    let defs_tokens = with_defs
        .search(q, SearchMode::Vector, 5)
        .await
        .unwrap()
        .budget
        .unwrap()
        .total_tokens;

    assert!(defs_tokens > bare_tokens);
}

#[tokio::test]
async fn test_pipeline_is_idempotent() {
    let store = MockVectorStore::new();
    store.insert("A", "termination requires notice", meta(), 0.1);
    store.insert("B", "fees payable quarterly", meta(), 0.4);

    let generator = MockGenerator::new()
        .respond_when("termination", "Score: 3")
        .with_default_response("Score: 2");

    let pipeline = QueryPipeline::new(
        HybridSearcher::new(store, None),
        Some(Reranker::new(generator)),
        budgeter(),
    );

    let first = pipeline.search("termination", SearchMode::Vector, 5).await.unwrap();
    let second = pipeline.search("termination", SearchMode::Vector, 5).await.unwrap();

    assert_eq!(first.decision, second.decision);
    let ids = |o: &PipelineOutcome| -> Vec<String> {
        o.final_chunks.iter().map(|c| c.chunk_id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(
        first.budget.as_ref().map(|b| b.total_tokens),
        second.budget.as_ref().map(|b| b.total_tokens)
    );
}
