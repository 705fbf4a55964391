use crate::index::LexicalCatalog;
use crate::models::{merge_key, round4, Chunk};
use crate::store::VectorStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Fuses vector similarity with normalized BM25 into one ranked candidate
/// list. Weights are fixed per instance, not tuned per query.
pub struct HybridRetriever {
    store: Arc<dyn VectorStore>,
    catalog: Arc<LexicalCatalog>,
    vector_weight: f32,
    lexical_weight: f32,
}

impl HybridRetriever {
    pub fn new(store: Arc<dyn VectorStore>, catalog: Arc<LexicalCatalog>) -> Self {
        Self::with_weights(store, catalog, 0.6, 0.4)
    }

    pub fn with_weights(
        store: Arc<dyn VectorStore>,
        catalog: Arc<LexicalCatalog>,
        vector_weight: f32,
        lexical_weight: f32,
    ) -> Self {
        Self {
            store,
            catalog,
            vector_weight,
            lexical_weight,
        }
    }

    pub fn catalog(&self) -> &LexicalCatalog {
        &self.catalog
    }

    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        // Vector side: distance becomes similarity. Records are merged by
        // the first 100 characters of their text; identical openings
        // collapse, which is accepted imprecision.
        let hits = self.store.query(query, top_k).await?;
        let mut merged: Vec<Chunk> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for hit in hits {
            let key = merge_key(&hit.text).to_string();
            if by_key.contains_key(&key) {
                continue;
            }
            let mut chunk = Chunk::new(hit.text, hit.source);
            chunk.vector_score = Some(round4(1.0 - hit.distance));
            chunk.bm25_score = Some(0.0);
            by_key.insert(key, merged.len());
            merged.push(chunk);
        }

        // Lexical side: score the whole corpus, keep the top_k, normalize
        // by the best score in that slice (1 stands in when it is not
        // positive).
        let index = self.catalog.get_or_build().await?;
        let scores = index.score(query);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order.truncate(top_k);

        let max_score = order.first().map(|&i| scores[i]).unwrap_or(0.0);
        let denom = if max_score > 0.0 { max_score } else { 1.0 };

        for &i in &order {
            let chunk = &index.chunks()[i];
            let norm = round4(scores[i] / denom);
            let key = merge_key(&chunk.text).to_string();
            if let Some(&pos) = by_key.get(&key) {
                merged[pos].bm25_score = Some(norm);
            } else {
                let mut fused = Chunk::new(chunk.text.clone(), chunk.source.clone());
                fused.vector_score = Some(0.0);
                fused.bm25_score = Some(norm);
                by_key.insert(key, merged.len());
                merged.push(fused);
            }
        }

        for chunk in &mut merged {
            let v = chunk.vector_score.unwrap_or(0.0);
            let l = chunk.bm25_score.unwrap_or(0.0);
            chunk.hybrid_score =
                Some(round4(self.vector_weight * v + self.lexical_weight * l));
        }

        // Stable sort: equal hybrid scores keep merge insertion order,
        // vector-sourced records ahead of lexical-only ones.
        merged.sort_by(|a, b| {
            b.hybrid_score
                .partial_cmp(&a.hybrid_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(top_k);

        debug!(query, candidates = merged.len(), "hybrid retrieval complete");
        Ok(merged)
    }
}
