use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

use pdf_rag::application::RagService;
use pdf_rag::cli::{self, ExitReason};
use pdf_rag::infrastructure::{
    init_tracing, AppConfig, OpenAiLlm, QdrantVectorStore, TextEmbedding,
};

/// Ask questions about the ingested PDF.
#[derive(Debug, Parser)]
#[command(name = "chat", version)]
struct Args {
    /// Number of chunks retrieved per question (overrides TOPK).
    #[arg(long)]
    top_k: Option<usize>,

    /// Answer this question and exit instead of starting the interactive loop.
    question: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("chat=warn,pdf_rag=warn");

    let args = Args::parse();

    let mut config = AppConfig::load().context("Could not start the chat; check the configuration")?;
    if let Some(top_k) = args.top_k {
        config.rag.top_k = top_k;
        config.validate()?;
    }

    let rag = build_rag_service(&config)?;
    info!(
        collection = %config.vector_store.collection,
        chat_model = %config.llm.model,
        embedding_model = %config.embedding.model,
        top_k = config.rag.top_k,
        "chat ready"
    );

    if let Some(question) = args.question {
        let answer = rag.answer(&question).await?;
        println!("{answer}");
        return Ok(());
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        reason = cli::run(&rag, stdin, &mut stdout) => {
            let reason = reason?;
            info!(?reason, "chat finished");
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nClosing...");
            info!(reason = ?ExitReason::EndOfInput, "chat interrupted");
            // The pending stdin read would block runtime shutdown.
            std::process::exit(0);
        }
    }

    Ok(())
}

fn build_rag_service(config: &AppConfig) -> anyhow::Result<RagService> {
    let embedding = Arc::new(TextEmbedding::from_config(&config.embedding));
    let vector_store = Arc::new(
        QdrantVectorStore::from_config(&config.vector_store)
            .context("Failed to create the Qdrant client")?,
    );
    let llm = Arc::new(OpenAiLlm::from_config(&config.llm));

    Ok(RagService::new(embedding, vector_store, llm, config.rag.top_k)
        .with_template(config.prompt_template()?))
}
