use crate::config::CragConfig;
use crate::llm::{ChatOptions, Message, ModelProvider};
use crate::models::{Chunk, CragStatus, RelevanceGrade};
use crate::retriever::HybridRetriever;
use crate::rewriter::QueryRewriter;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Grading reads only this many leading characters of a chunk. Cheap and
/// partial on purpose.
const GRADE_PREFIX_LEN: usize = 500;

/// Classifies one chunk's usefulness for a question by asking an external
/// judge. Off-label judge output degrades to Ambiguous, never to Relevant.
pub struct RelevanceGrader {
    provider: Arc<dyn ModelProvider>,
}

impl RelevanceGrader {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub async fn grade(&self, question: &str, chunk_text: &str) -> Result<RelevanceGrade> {
        let chunk = grade_prefix(chunk_text);
        let prompt = format!(
            r#"You are a relevance grader for a financial RAG system.

Given a user question and a chunk from an earnings call transcript, grade whether the chunk is useful for answering the question.

Respond with ONLY one of these three words:
- RELEVANT   (chunk directly helps answer the question)
- IRRELEVANT (chunk has nothing to do with the question)
- AMBIGUOUS  (chunk is partially related but not directly useful)

User Question: {question}
Transcript Chunk: {chunk}

Grade (one word only):"#
        );

        let raw = self
            .provider
            .chat(
                &[Message::user(prompt)],
                ChatOptions {
                    temperature: 0.0,
                    max_tokens: Some(10),
                },
            )
            .await?;
        Ok(RelevanceGrade::parse(&raw))
    }
}

fn grade_prefix(text: &str) -> &str {
    match text.char_indices().nth(GRADE_PREFIX_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The corrective loop. Grades the reranked chunks against the ORIGINAL
/// question; when the evidence is judged insufficient, refines the query
/// and re-retrieves once. There is no second correction attempt.
pub struct CragEngine {
    grader: RelevanceGrader,
    rewriter: Arc<QueryRewriter>,
    config: CragConfig,
}

impl CragEngine {
    pub fn new(grader: RelevanceGrader, rewriter: Arc<QueryRewriter>, config: CragConfig) -> Self {
        Self {
            grader,
            rewriter,
            config,
        }
    }

    pub async fn apply(
        &self,
        question: &str,
        chunks: &[Chunk],
        retriever: &HybridRetriever,
    ) -> Result<(Vec<Chunk>, CragStatus)> {
        let mut graded: Vec<Chunk> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let grade = self.grader.grade(question, &chunk.text).await?;
            debug!(source = %chunk.source, grade = %grade, "graded chunk");
            let mut chunk = chunk.clone();
            chunk.relevance_grade = Some(grade);
            graded.push(chunk);
        }

        let relevant = count_grades(&graded, RelevanceGrade::Relevant);
        let irrelevant = count_grades(&graded, RelevanceGrade::Irrelevant);

        if irrelevant >= self.config.irrelevant_threshold || relevant == 0 {
            info!(
                irrelevant,
                total = graded.len(),
                "too many irrelevant chunks, refining query"
            );
            let refined = self.rewriter.refine(question).await?;
            debug!(refined = %refined, "refined query");

            let pool = retriever
                .retrieve(&refined, self.config.corrected_pool_k)
                .await?;

            // Fresh grade assignments for the new chunks; the first pass
            // keeps its grades untouched.
            let mut corrected: Vec<Chunk> = Vec::new();
            for mut chunk in pool.into_iter().take(self.config.graded_top_k) {
                let grade = self.grader.grade(question, &chunk.text).await?;
                debug!(source = %chunk.source, grade = %grade, "re-graded chunk");
                chunk.relevance_grade = Some(grade);
                corrected.push(chunk);
            }

            // At most one retry: the second pass ships as CORRECTED no
            // matter how its grades come out. An empty re-retrieval falls
            // back to the first-pass chunks so the evidence set stays
            // non-empty.
            if corrected.is_empty() {
                return Ok((graded, CragStatus::Corrected));
            }
            return Ok((corrected, CragStatus::Corrected));
        }

        let good: Vec<Chunk> = graded
            .iter()
            .filter(|c| c.relevance_grade != Some(RelevanceGrade::Irrelevant))
            .cloned()
            .collect();

        // Never return an empty evidence set.
        let final_chunks = if good.is_empty() { graded } else { good };
        Ok((final_chunks, CragStatus::Passed))
    }
}

fn count_grades(chunks: &[Chunk], grade: RelevanceGrade) -> usize {
    chunks
        .iter()
        .filter(|c| c.relevance_grade == Some(grade))
        .count()
}
