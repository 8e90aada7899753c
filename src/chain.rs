//! Two-step answer composer: retrieve then prompt.
//!
//! Stateless; every question is an independent retrieve-and-complete pass
//! with no memory across calls.

use std::sync::Arc;

use crate::error::RagError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::store::{RetrievedDocument, Retriever};

const CHAIN_TOP_K: usize = 4;

const RAG_PROMPT_TEMPLATE: &str = "You are a helpful and friendly e-commerce customer support assistant.
Answer the customer's question using ONLY the information provided in the FAQ context below.
If the context does not contain enough information, say:
\"I'm sorry, I don't have that information. Please contact our support team directly.\"

FAQ Context:
{context}

Customer Question: {question}

Answer:";

/// Concatenate retrieved FAQ Q&A pairs into a readable context block.
pub fn format_context(docs: &[RetrievedDocument]) -> String {
    docs.iter()
        .map(|doc| format!("FAQ #{}:\n{}", doc.document.metadata.index, doc.document.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

pub struct RagChain {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LlmProvider>,
    model: String,
}

impl RagChain {
    pub fn new(retriever: Arc<dyn Retriever>, llm: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            retriever,
            llm,
            model: model.into(),
        }
    }

    /// Retrieve the top FAQ entries for `question` without answering.
    ///
    /// Exposed so the command layer can show the customer which FAQs the
    /// answer was grounded in.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedDocument>, RagError> {
        self.retriever.search(question, CHAIN_TOP_K).await
    }

    /// Run the two-step RAG chain and return the raw completion text.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let docs = self.retrieve(question).await?;
        self.answer_with_context(question, &docs).await
    }

    /// Compose the answer from already-retrieved documents.
    pub async fn answer_with_context(
        &self,
        question: &str,
        docs: &[RetrievedDocument],
    ) -> Result<String, RagError> {
        let context = format_context(docs);
        let prompt = RAG_PROMPT_TEMPLATE
            .replace("{context}", &context)
            .replace("{question}", question);

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]).with_temperature(0.0);
        self.llm.chat(request, &self.model).await
    }
}
