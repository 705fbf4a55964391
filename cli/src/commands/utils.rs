use anyhow::Result;
use console::Style;
use earningsiq_core::config::{Config, EmbeddingBackend};
use earningsiq_core::embeddings::{Embedder, ExternalEmbedder, OllamaEmbedder};
use earningsiq_core::llm::OpenAIProvider;
use earningsiq_core::models::PipelineResult;
use earningsiq_core::pipeline::Pipeline;
use earningsiq_core::rerank::CrossEncoderClient;
use earningsiq_core::store::{ChromaStore, VectorStore};
use std::sync::Arc;

pub fn build_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let embedder: Arc<dyn Embedder> = match config.embeddings.backend {
        EmbeddingBackend::External => {
            Arc::new(ExternalEmbedder::new(config.embeddings.model_name.clone())?)
        }
        EmbeddingBackend::Ollama => {
            Arc::new(OllamaEmbedder::new(config.embeddings.model_name.clone())?)
        }
    };
    Ok(Arc::new(ChromaStore::new(
        config.store.base_url.clone(),
        config.store.collection.clone(),
        embedder,
    )?))
}

pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let store = build_store(config)?;
    let scorer = Arc::new(CrossEncoderClient::new(
        config.rerank.model.clone(),
        config.rerank.api_base.clone(),
        config.rerank.timeout_secs,
    )?);
    let provider = Arc::new(OpenAIProvider::new(
        config.llm.model.clone(),
        config.llm.timeout_secs,
    )?);
    Ok(Pipeline::new(config, store, scorer, provider))
}

pub fn print_result(result: &PipelineResult, verbose: bool) {
    let dim = Style::new().dim();
    let bold = Style::new().bold();

    println!();
    println!("{}", bold.apply_to("Rewritten Query:"));
    println!("  {}", result.rewritten_query);
    println!();
    println!(
        "{} {}",
        bold.apply_to("CRAG Status:"),
        result.crag_status
    );
    println!(
        "  {}",
        dim.apply_to("(PASSED = chunks were relevant | CORRECTED = re-retrieved)")
    );
    println!();

    if verbose {
        println!("{}", bold.apply_to("Reranked Candidates:"));
        for (i, chunk) in result.reranked_chunks.iter().enumerate() {
            println!(
                "  [{}] {} | hybrid: {} | rerank: {}",
                i + 1,
                chunk.source,
                chunk
                    .hybrid_score
                    .map(|s| format!("{:.4}", s))
                    .unwrap_or_else(|| "-".to_string()),
                chunk
                    .rerank_score
                    .map(|s| format!("{:.4}", s))
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
        println!();
    }

    println!("{}", bold.apply_to("Final Sources Used:"));
    for (i, chunk) in result.final_chunks.iter().enumerate() {
        let grade = chunk
            .relevance_grade
            .map(|g| g.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        println!("  [{}] {} | grade: {}", i + 1, chunk.source, grade);
    }

    println!();
    println!("{}", bold.apply_to("Answer:"));
    println!("{}", "-".repeat(60));
    println!("{}", result.answer);
    println!("{}", "=".repeat(60));
}
