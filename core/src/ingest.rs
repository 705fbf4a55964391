use crate::config::IngestConfig;
use crate::models::{CorpusChunk, TranscriptDoc};
use crate::store::VectorStore;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Splits "2019-Dec-18-MU.txt" into ("MU", "2019-Dec-18").
pub fn parse_filename(filename: &str) -> Option<(String, String)> {
    let name = filename.strip_suffix(".txt")?;
    let (date, ticker) = name.rsplit_once('-')?;
    if ticker.is_empty() || date.is_empty() {
        return None;
    }
    Some((ticker.to_string(), date.to_string()))
}

/// Loads every .txt transcript directly under `data_dir`. Unreadable files
/// and unrecognized names are skipped with a warning rather than failing
/// the whole run.
pub fn load_transcripts(data_dir: &Path) -> Result<Vec<TranscriptDoc>> {
    let mut documents = Vec::new();
    for entry in WalkDir::new(data_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        let Some((ticker, date)) = parse_filename(&filename) else {
            warn!(file = %filename, "skipping transcript with unrecognized name");
            continue;
        };
        match std::fs::read(path) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                documents.push(TranscriptDoc {
                    text,
                    source: format!("{} | {}", ticker, date),
                    filename,
                });
            }
            Err(err) => {
                warn!(file = %filename, error = %err, "skipping unreadable transcript");
            }
        }
    }
    Ok(documents)
}

/// Overlapping word windows over one transcript; short tail windows are
/// dropped.
pub fn chunk_text(text: &str, source: &str, config: &IngestConfig) -> Vec<CorpusChunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let step = config
        .chunk_size
        .saturating_sub(config.chunk_overlap)
        .max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + config.chunk_size).min(words.len());
        if end - start > config.min_chunk_words {
            chunks.push(CorpusChunk {
                text: words[start..end].join(" "),
                source: source.to_string(),
            });
        }
        start += step;
    }
    chunks
}

/// Full reingestion: load, chunk, reset the collection, store in batches.
/// Returns the number of chunks written.
pub async fn build_vectorstore(
    store: &dyn VectorStore,
    config: &IngestConfig,
    data_dir: &Path,
) -> Result<usize> {
    let documents = load_transcripts(data_dir)?;
    if documents.is_empty() {
        anyhow::bail!("no .txt transcripts found under {}", data_dir.display());
    }
    info!(transcripts = documents.len(), "loaded transcripts");

    let mut all_chunks: Vec<CorpusChunk> = Vec::new();
    for doc in &documents {
        let chunks = chunk_text(&doc.text, &doc.source, config);
        info!(source = %doc.source, chunks = chunks.len(), "chunked transcript");
        all_chunks.extend(chunks);
    }
    info!(total = all_chunks.len(), "chunking complete");

    store.reset().await.context("failed to reset collection")?;

    let mut written = 0;
    for batch in all_chunks.chunks(config.batch_size) {
        let ids: Vec<String> = batch.iter().map(|c| chunk_id(&c.source, &c.text)).collect();
        store.add(&ids, batch).await?;
        written += batch.len();
        info!(written, total = all_chunks.len(), "stored batch");
    }

    Ok(written)
}

/// Content-addressed chunk id over source and text.
fn chunk_id(source: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\0");
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..16])
}
