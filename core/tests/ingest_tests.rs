mod common;

use common::FixedVectorStore;
use earningsiq_core::config::{Config, IngestConfig};
use earningsiq_core::ingest::{build_vectorstore, chunk_text, load_transcripts, parse_filename};
use earningsiq_core::store::VectorStore;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
}

#[test]
fn filename_parsing_splits_date_and_ticker() {
    assert_eq!(
        parse_filename("2019-Dec-18-MU.txt"),
        Some(("MU".to_string(), "2019-Dec-18".to_string()))
    );
    assert_eq!(
        parse_filename("2016-Apr-26-AAPL.txt"),
        Some(("AAPL".to_string(), "2016-Apr-26".to_string()))
    );
    assert_eq!(parse_filename("notes.md"), None);
    assert_eq!(parse_filename("plain.txt"), None);
    assert_eq!(parse_filename(".txt"), None);
}

#[test]
fn chunking_windows_overlap_and_drop_short_tails() {
    let config = IngestConfig::default();
    let text = words(1000);

    let chunks = chunk_text(&text, "MU | 2019-Dec-18", &config);

    // Windows of 400 words stepping by 350: [0,400), [350,750), [700,1000).
    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].text.starts_with("w0 "));
    assert!(chunks[1].text.starts_with("w350 "));
    assert!(chunks[2].text.starts_with("w700 "));
    assert_eq!(chunks[0].text.split_whitespace().count(), 400);
    assert_eq!(chunks[2].text.split_whitespace().count(), 300);
    assert!(chunks.iter().all(|c| c.source == "MU | 2019-Dec-18"));
}

#[test]
fn tiny_transcripts_produce_no_chunks() {
    let config = IngestConfig::default();
    assert!(chunk_text(&words(70), "MU | 2019-Dec-18", &config).is_empty());
    assert_eq!(chunk_text(&words(100), "MU | 2019-Dec-18", &config).len(), 1);
}

#[test]
fn loads_only_well_named_txt_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("2019-Dec-18-MU.txt"), words(120)).unwrap();
    fs::write(dir.path().join("notes.md"), "ignored").unwrap();
    fs::write(dir.path().join("plain.txt"), "skipped, no date-ticker name").unwrap();

    let docs = load_transcripts(dir.path()).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].source, "MU | 2019-Dec-18");
    assert_eq!(docs[0].filename, "2019-Dec-18-MU.txt");
}

#[tokio::test]
async fn ingestion_resets_then_stores_all_chunks() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("2019-Dec-18-MU.txt"), words(500)).unwrap();
    fs::write(dir.path().join("2020-Jan-28-AAPL.txt"), words(90)).unwrap();

    let store = Arc::new(FixedVectorStore::new(vec![], vec![]));
    let config = IngestConfig::default();

    let written = build_vectorstore(store.as_ref(), &config, dir.path())
        .await
        .unwrap();

    // MU yields [0,400) and [350,500); AAPL yields one 90-word chunk.
    assert_eq!(written, 3);
    assert_eq!(store.count().await.unwrap(), 3);

    let corpus = store.corpus.lock().unwrap();
    assert_eq!(
        corpus.iter().filter(|c| c.source == "MU | 2019-Dec-18").count(),
        2
    );
    assert_eq!(
        corpus
            .iter()
            .filter(|c| c.source == "AAPL | 2020-Jan-28")
            .count(),
        1
    );
}

#[tokio::test]
async fn ingestion_fails_on_empty_directory() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FixedVectorStore::new(vec![], vec![]));

    let result = build_vectorstore(store.as_ref(), &IngestConfig::default(), dir.path()).await;

    assert!(result.is_err());
}

#[test]
fn config_defaults_match_the_pipeline_constants() {
    let config = Config::load_from(Some(std::path::Path::new("no-such-file.yml"))).unwrap();

    assert_eq!(config.retrieval.candidate_pool, 20);
    assert_eq!(config.retrieval.rerank_top_k, 3);
    assert_eq!(config.retrieval.vector_weight, 0.6);
    assert_eq!(config.retrieval.lexical_weight, 0.4);
    assert_eq!(config.crag.graded_top_k, 3);
    assert_eq!(config.crag.irrelevant_threshold, 2);
    assert_eq!(config.crag.corrected_pool_k, 20);
    assert_eq!(config.ingest.chunk_size, 400);
    assert_eq!(config.ingest.chunk_overlap, 50);
    assert_eq!(config.store.collection, "transcripts");
}

#[test]
fn config_yaml_overrides_merge_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("earningsiq.yml");
    fs::write(
        &path,
        "retrieval:\n  candidate_pool: 10\ncrag:\n  irrelevant_threshold: 3\n",
    )
    .unwrap();

    let config = Config::load_from(Some(&path)).unwrap();

    assert_eq!(config.retrieval.candidate_pool, 10);
    assert_eq!(config.crag.irrelevant_threshold, 3);
    // Untouched sections keep their defaults.
    assert_eq!(config.retrieval.vector_weight, 0.6);
    assert_eq!(config.crag.corrected_pool_k, 20);
}
