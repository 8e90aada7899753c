//! Command implementations behind the CLI: indexing and the two ask flows.

use std::sync::Arc;

use crate::agent::FaqAgent;
use crate::chain::RagChain;
use crate::config::Settings;
use crate::dataset::load_faq_documents;
use crate::embeddings::EmbeddingModel;
use crate::error::RagError;
use crate::llm::{LlmProvider, OpenRouterProvider};
use crate::store::{PineconeIndex, VectorIndex, VectorStore};

const CHAIN_DEMO_QUESTIONS: [&str; 5] = [
    "How do I track my order?",
    "What is your return policy?",
    "Do you offer international shipping?",
    "I forgot my password, how can I reset it?",
    "Are there any discounts available for new customers?",
];

const AGENT_DEMO_QUESTIONS: [&str; 3] = [
    "How do I create an account?",
    "What payment methods do you accept, and can I use a promo code at checkout?",
    "I want to return a product I received damaged. What is your return policy and how long will the refund take?",
];

async fn connect_store(
    settings: &Settings,
    provider: Arc<dyn LlmProvider>,
) -> Result<VectorStore, RagError> {
    let embedder = EmbeddingModel::from_settings(provider, settings)?;
    let index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::from_settings(settings)?);
    VectorStore::connect(index, embedder, &settings.index_name).await
}

/// Load the FAQ dataset, embed every entry, and store the vectors.
pub async fn run_index(settings: &Settings) -> Result<(), RagError> {
    println!("RAG Indexing Pipeline");
    println!("Dataset: {}", settings.dataset_path.display());

    println!("\n[1/2] Loading FAQ documents from JSON dataset...");
    let docs = load_faq_documents(&settings.dataset_path)?;

    println!("\n  Preview of first 2 documents:");
    for doc in docs.iter().take(2) {
        let preview: String = doc.content.chars().take(140).collect();
        println!("  {}...", preview);
        println!(
            "  metadata: source={}, question={}, index={}",
            doc.metadata.source, doc.metadata.question, doc.metadata.index
        );
    }

    println!("\n[2/2] Embedding {} FAQ pairs and storing in Pinecone...", docs.len());
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenRouterProvider::from_settings(settings)?);
    let store = connect_store(settings, provider).await?;

    let ids = store.add_documents(&docs).await?;
    println!("Stored {} document vectors in '{}'.", ids.len(), store.index_name());
    println!("Sample IDs: {:?}", &ids[..ids.len().min(3)]);

    Ok(())
}

/// Answer questions with the two-step retrieve-then-prompt chain.
pub async fn run_ask_chain(settings: &Settings, questions: Vec<String>) -> Result<(), RagError> {
    let questions = or_demo(questions, &CHAIN_DEMO_QUESTIONS);

    println!("Initialising vector store and LLM...");
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenRouterProvider::from_settings(settings)?);
    let store = connect_store(settings, provider.clone()).await?;
    let chain = RagChain::new(Arc::new(store), provider, &settings.chat_model);

    for question in questions {
        print_question_banner(&question);

        // Show retrieved FAQs for transparency before answering.
        let retrieved = chain.retrieve(&question).await?;
        println!("\nTop {} retrieved FAQs:", retrieved.len());
        for (i, doc) in retrieved.iter().enumerate() {
            println!("  [{}] {}", i + 1, doc.document.metadata.question);
        }

        println!("\nGenerating answer...");
        let answer = chain.answer_with_context(&question, &retrieved).await?;
        println!("\nAnswer:\n{}\n", answer);
    }

    Ok(())
}

/// Answer questions with the tool-calling agent.
pub async fn run_ask_agent(settings: &Settings, questions: Vec<String>) -> Result<(), RagError> {
    let questions = or_demo(questions, &AGENT_DEMO_QUESTIONS);

    println!("Initialising vector store and LLM...");
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenRouterProvider::from_settings(settings)?);
    let store = connect_store(settings, provider.clone()).await?;
    let agent = FaqAgent::new(Arc::new(store), provider, &settings.tool_model);

    for question in questions {
        print_question_banner(&question);
        let answer = agent.answer(&question).await?;
        println!("\nAnswer:\n{}\n", answer);
    }

    Ok(())
}

fn or_demo(questions: Vec<String>, demo: &[&str]) -> Vec<String> {
    if questions.is_empty() {
        demo.iter().map(|q| q.to_string()).collect()
    } else {
        questions
    }
}

fn print_question_banner(question: &str) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Customer: {}", question);
    println!("{}", rule);
}
