use clap::{Parser, Subcommand};

use faq_rag::commands;
use faq_rag::config::Settings;
use faq_rag::logging;

#[derive(Parser)]
#[command(name = "faq-rag", about = "Retrieval-augmented FAQ chatbot over OpenRouter and Pinecone")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the FAQ dataset, embed it, and store the vectors
    Index,
    /// Answer questions with the two-step retrieve-then-prompt chain
    Ask {
        /// Questions to answer; runs the demo set when omitted
        questions: Vec<String>,
    },
    /// Answer questions with the tool-calling agent
    Agent {
        /// Questions to answer; runs the demo set when omitted
        questions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Index => commands::run_index(&settings).await?,
        Command::Ask { questions } => commands::run_ask_chain(&settings, questions).await?,
        Command::Agent { questions } => commands::run_ask_agent(&settings, questions).await?,
    }

    Ok(())
}
