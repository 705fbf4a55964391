use crate::config::{Config, RetrievalConfig};
use crate::crag::{CragEngine, RelevanceGrader};
use crate::generator::AnswerGenerator;
use crate::index::LexicalCatalog;
use crate::llm::ModelProvider;
use crate::models::PipelineResult;
use crate::rerank::{Reranker, RerankScorer};
use crate::retriever::HybridRetriever;
use crate::rewriter::QueryRewriter;
use crate::store::VectorStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// The five-stage query pipeline: rewrite, hybrid retrieval, rerank,
/// corrective grading, answer generation. Retrieval and reranking see the
/// rewritten query (recall); grading and generation see the original
/// (fidelity to user intent).
pub struct Pipeline {
    rewriter: Arc<QueryRewriter>,
    retriever: HybridRetriever,
    reranker: Reranker,
    crag: CragEngine,
    generator: AnswerGenerator,
    catalog: Arc<LexicalCatalog>,
    retrieval: RetrievalConfig,
}

impl Pipeline {
    pub fn new(
        config: &Config,
        store: Arc<dyn VectorStore>,
        scorer: Arc<dyn RerankScorer>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        let catalog = Arc::new(LexicalCatalog::new(store.clone()));
        let retriever = HybridRetriever::with_weights(
            store,
            catalog.clone(),
            config.retrieval.vector_weight,
            config.retrieval.lexical_weight,
        );
        let rewriter = Arc::new(QueryRewriter::new(provider.clone()));
        let crag = CragEngine::new(
            RelevanceGrader::new(provider.clone()),
            rewriter.clone(),
            config.crag.clone(),
        );

        Self {
            retriever,
            reranker: Reranker::new(scorer),
            crag,
            generator: AnswerGenerator::new(provider),
            rewriter,
            catalog,
            retrieval: config.retrieval.clone(),
        }
    }

    /// Drops the cached corpus snapshot and rebuilds the lexical index,
    /// picking up anything ingested since the last build.
    pub async fn rebuild_index(&self) -> Result<()> {
        self.catalog.rebuild().await?;
        Ok(())
    }

    pub async fn run(&self, query: &str) -> Result<PipelineResult> {
        info!(query, "running pipeline");

        let rewritten = self.rewriter.rewrite(query).await?;
        debug!(rewritten = %rewritten, "query rewritten");

        let candidates = self
            .retriever
            .retrieve(&rewritten, self.retrieval.candidate_pool)
            .await?;

        let reranked = self
            .reranker
            .rerank(&rewritten, &candidates, self.retrieval.rerank_top_k)
            .await?;

        let (final_chunks, crag_status) = self.crag.apply(query, &reranked, &self.retriever).await?;
        info!(status = %crag_status, chunks = final_chunks.len(), "grading complete");

        let answer = self.generator.generate(query, &final_chunks).await?;

        Ok(PipelineResult {
            original_query: query.to_string(),
            rewritten_query: rewritten,
            reranked_chunks: reranked,
            final_chunks,
            crag_status,
            answer,
        })
    }
}
