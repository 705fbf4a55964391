use crate::models::CorpusChunk;
use crate::store::VectorStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

const K1: f32 = 1.5;
const B: f32 = 0.75;

/// Okapi BM25 statistics over one corpus snapshot. Scoring covers the whole
/// corpus, not a top-k slice; callers pick their cutoff afterwards.
pub struct CorpusIndex {
    chunks: Vec<CorpusChunk>,
    // term -> (chunk position, term frequency)
    postings: HashMap<String, Vec<(usize, f32)>>,
    doc_lens: Vec<f32>,
    avg_doc_len: f32,
}

impl CorpusIndex {
    pub fn build(chunks: Vec<CorpusChunk>) -> Self {
        let mut postings: HashMap<String, Vec<(usize, f32)>> = HashMap::new();
        let mut doc_lens = Vec::with_capacity(chunks.len());

        for (pos, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.text);
            doc_lens.push(tokens.len() as f32);
            let mut tf: HashMap<String, f32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_default() += 1.0;
            }
            for (term, freq) in tf {
                postings.entry(term).or_default().push((pos, freq));
            }
        }

        let total: f32 = doc_lens.iter().sum();
        let avg_doc_len = if doc_lens.is_empty() {
            1.0
        } else {
            (total / doc_lens.len() as f32).max(1.0)
        };

        Self {
            chunks,
            postings,
            doc_lens,
            avg_doc_len,
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[CorpusChunk] {
        &self.chunks
    }

    /// BM25 score of every corpus chunk against the query, in corpus order.
    pub fn score(&self, query: &str) -> Vec<f32> {
        let n = self.chunks.len() as f32;
        let mut scores = vec![0.0f32; self.chunks.len()];
        for term in tokenize(query) {
            let Some(list) = self.postings.get(&term) else {
                continue;
            };
            let df = list.len() as f32;
            let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
            for &(pos, tf) in list {
                let norm = K1 * (1.0 - B + B * self.doc_lens[pos] / self.avg_doc_len);
                scores[pos] += idf * (tf * (K1 + 1.0)) / (tf + norm);
            }
        }
        scores
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Process-wide home of the lexical index. The first caller pays for the
/// corpus snapshot and the build; everyone after that shares the cached
/// index. The snapshot goes stale if the store is reingested without a
/// `rebuild()`.
pub struct LexicalCatalog {
    store: Arc<dyn VectorStore>,
    index: RwLock<Option<Arc<CorpusIndex>>>,
}

impl LexicalCatalog {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            index: RwLock::new(None),
        }
    }

    pub async fn get_or_build(&self) -> Result<Arc<CorpusIndex>> {
        if let Some(index) = self.index.read().await.as_ref() {
            return Ok(index.clone());
        }
        let mut guard = self.index.write().await;
        // Another caller may have built it while we waited for the lock.
        if let Some(index) = guard.as_ref() {
            return Ok(index.clone());
        }
        let index = self.build().await?;
        *guard = Some(index.clone());
        Ok(index)
    }

    /// Re-snapshots the corpus and replaces the cached index.
    pub async fn rebuild(&self) -> Result<Arc<CorpusIndex>> {
        let mut guard = self.index.write().await;
        let index = self.build().await?;
        *guard = Some(index.clone());
        Ok(index)
    }

    async fn build(&self) -> Result<Arc<CorpusIndex>> {
        let chunks = self.store.get_all().await?;
        info!(chunks = chunks.len(), "building lexical index");
        Ok(Arc::new(CorpusIndex::build(chunks)))
    }
}
