mod common;

use common::{corpus_chunk, hit, FixedVectorStore, OverlapRerankScorer, ScriptedProvider};
use earningsiq_core::config::Config;
use earningsiq_core::llm::ModelProvider;
use earningsiq_core::models::{CragStatus, RelevanceGrade};
use earningsiq_core::pipeline::Pipeline;
use earningsiq_core::rerank::RerankScorer;
use earningsiq_core::store::VectorStore;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const QUESTION: &str = "What did Apple say about iPhone revenue in 2018?";
const REWRITTEN: &str = "Apple Inc AAPL iPhone revenue growth fiscal 2018";

const AAPL_TEXT: &str = "iPhone revenue grew 13 percent year over year in fiscal 2018 with \
    double-digit growth in every geographic segment worldwide.";
const NVDA_DC_TEXT: &str = "Data center momentum was driven by deep learning adoption across \
    hyperscale customers this quarter.";
const NVDA_GAMING_TEXT: &str = "Gaming GPU demand remained healthy with strong momentum in \
    the installed base.";

fn fixture_store() -> Arc<FixedVectorStore> {
    let corpus = vec![
        corpus_chunk(AAPL_TEXT, "AAPL | 2018-Feb-01"),
        corpus_chunk(NVDA_DC_TEXT, "NVDA | 2018-Feb-08"),
        corpus_chunk(NVDA_GAMING_TEXT, "NVDA | 2018-Nov-15"),
    ];
    let hits = vec![
        hit(AAPL_TEXT, "AAPL | 2018-Feb-01", 0.2),
        hit(NVDA_DC_TEXT, "NVDA | 2018-Feb-08", 0.6),
        hit(NVDA_GAMING_TEXT, "NVDA | 2018-Nov-15", 0.7),
    ];
    Arc::new(FixedVectorStore::new(corpus, hits))
}

fn pipeline_with(
    store: &Arc<FixedVectorStore>,
    provider: &Arc<ScriptedProvider>,
) -> Pipeline {
    let store_dyn: Arc<dyn VectorStore> = store.clone();
    let scorer: Arc<dyn RerankScorer> = Arc::new(OverlapRerankScorer);
    let provider_dyn: Arc<dyn ModelProvider> = provider.clone();
    Pipeline::new(&Config::default(), store_dyn, scorer, provider_dyn)
}

#[tokio::test]
async fn answers_apple_question_from_aapl_chunk() {
    let store = fixture_store();
    let provider = Arc::new(ScriptedProvider::new(&[
        REWRITTEN,
        "RELEVANT",
        "AMBIGUOUS",
        "IRRELEVANT",
        "iPhone revenue grew 13% year over year. [Source: AAPL | 2018-Feb-01]",
    ]));
    let pipeline = pipeline_with(&store, &provider);

    let result = pipeline.run(QUESTION).await.unwrap();

    assert_eq!(result.original_query, QUESTION);
    assert_eq!(result.rewritten_query, REWRITTEN);

    // Fusion plus reranking puts the AAPL chunk on top.
    assert_eq!(result.reranked_chunks.len(), 3);
    assert_eq!(result.reranked_chunks[0].source, "AAPL | 2018-Feb-01");
    assert!(result.reranked_chunks[0].hybrid_score.unwrap() > 0.0);
    assert!(result.reranked_chunks[0].rerank_score.is_some());

    assert_eq!(result.crag_status, CragStatus::Passed);
    assert_eq!(
        result.final_chunks[0].relevance_grade,
        Some(RelevanceGrade::Relevant)
    );
    // The IRRELEVANT gaming chunk was filtered out.
    assert_eq!(result.final_chunks.len(), 2);
    assert!(result.answer.contains("[Source: AAPL | 2018"));
}

#[tokio::test]
async fn retrieval_sees_rewritten_query_and_grading_sees_original() {
    let store = fixture_store();
    let provider = Arc::new(ScriptedProvider::new(&[
        REWRITTEN,
        "RELEVANT",
        "RELEVANT",
        "RELEVANT",
        "fine answer",
    ]));
    let pipeline = pipeline_with(&store, &provider);

    pipeline.run(QUESTION).await.unwrap();

    // One retrieval, made with the rewritten query.
    assert_eq!(store.query_count.load(Ordering::SeqCst), 1);
    assert_eq!(*store.last_query.lock().unwrap(), REWRITTEN);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 5);
    // Grading and generation both carry the original question verbatim.
    for prompt in &prompts[1..] {
        assert!(prompt.contains(QUESTION));
    }
}

#[tokio::test]
async fn bad_grades_run_one_corrective_pass_end_to_end() {
    let store = fixture_store();
    let provider = Arc::new(ScriptedProvider::new(&[
        REWRITTEN,
        "IRRELEVANT",
        "IRRELEVANT",
        "RELEVANT",
        "Apple iPhone handset revenue fiscal 2018",
        "RELEVANT",
        "AMBIGUOUS",
        "AMBIGUOUS",
        "answer built from corrected evidence",
    ]));
    let pipeline = pipeline_with(&store, &provider);

    let result = pipeline.run(QUESTION).await.unwrap();

    assert_eq!(result.crag_status, CragStatus::Corrected);
    assert_eq!(result.final_chunks.len(), 3);
    // Initial retrieval plus exactly one corrective retrieval at the wider
    // pool size.
    assert_eq!(store.query_count.load(Ordering::SeqCst), 2);
    assert_eq!(store.last_k.load(Ordering::SeqCst), 20);
    // The first-pass chunks keep their grades in the result bundle.
    assert_eq!(provider.remaining(), 0);
}
