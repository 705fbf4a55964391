use crate::llm::{ChatOptions, Message, ModelProvider};
use crate::models::Chunk;
use anyhow::Result;
use std::sync::Arc;

/// Final answer generation over the surviving evidence set. Each chunk is
/// tagged with its source so the model can cite [Source: TICKER | DATE].
pub struct AnswerGenerator {
    provider: Arc<dyn ModelProvider>,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate(&self, question: &str, chunks: &[Chunk]) -> Result<String> {
        let context = chunks
            .iter()
            .map(|c| format!("[Source: {}]\n{}", c.source, c.text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        let prompt = format!(
            r#"You are EarningsIQ, an expert financial analyst assistant specializing in NASDAQ earnings call analysis.

Answer the user's question based ONLY on the provided context from real earnings call transcripts.

Rules:
- Only use information from the provided context
- Always cite which company and date the info comes from using [Source: TICKER | DATE]
- If context doesn't have enough info, say "The available transcripts don't contain enough information about this"
- Be precise and professional like a financial analyst
- Structure your answer clearly

Context from earnings call transcripts:
{context}

User Question: {question}

Answer:"#
        );

        let answer = self
            .provider
            .chat(
                &[Message::user(prompt)],
                ChatOptions {
                    temperature: 0.1,
                    max_tokens: Some(600),
                },
            )
            .await?;
        Ok(answer.trim().to_string())
    }
}
