use crate::llm::{ChatOptions, Message, ModelProvider};
use anyhow::Result;
use std::sync::Arc;

/// Query reformulation. `rewrite` runs before retrieval and optimizes for
/// recall; `refine` runs only after a rejected grading pass and is told the
/// prior retrieval failed. The two prompts are deliberately separate
/// contracts.
pub struct QueryRewriter {
    provider: Arc<dyn ModelProvider>,
}

impl QueryRewriter {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub async fn rewrite(&self, query: &str) -> Result<String> {
        let prompt = format!(
            r#"You are an expert at reformulating financial questions to improve document retrieval from earnings call transcripts.

Given a user question, rewrite it to:
1. Be more specific and detailed
2. Include relevant financial/business terms and synonyms
3. Expand company nicknames to full context (e.g. "Apple" -> "Apple Inc AAPL iPhone revenue")
4. Make it optimal for semantic search over earnings call transcripts

Examples:
- "how is Apple doing?" -> "Apple Inc AAPL revenue growth profitability iPhone sales guidance fiscal performance outlook"
- "what risks did companies mention?" -> "risk factors challenges headwinds uncertainty macroeconomic supply chain demand company earnings call"
- "tell me about NVDA chips" -> "NVIDIA GPU data center semiconductor chip revenue growth demand AI machine learning"

User Question: {query}

Return ONLY the rewritten query. No explanation, no preamble. Just the rewritten query."#
        );

        let out = self
            .provider
            .chat(
                &[Message::user(prompt)],
                ChatOptions {
                    temperature: 0.3,
                    max_tokens: Some(150),
                },
            )
            .await?;
        Ok(out.trim().to_string())
    }

    pub async fn refine(&self, query: &str) -> Result<String> {
        let prompt = format!(
            r#"You are a financial search query expert.

The original query failed to retrieve good results.
Rewrite it differently to find better information.

Original Query: {query}
Problem: Retrieved chunks were mostly irrelevant

Write a completely different search query (one line only):"#
        );

        let out = self
            .provider
            .chat(
                &[Message::user(prompt)],
                ChatOptions {
                    temperature: 0.4,
                    max_tokens: Some(100),
                },
            )
            .await?;
        Ok(out.trim().to_string())
    }
}
