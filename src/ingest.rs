use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use pdf_rag::application::IngestionService;
use pdf_rag::infrastructure::{
    init_tracing, AppConfig, PdfLoader, QdrantVectorStore, TextEmbedding,
};

/// Load a PDF into the vector store.
#[derive(Debug, Parser)]
#[command(name = "ingest", version)]
struct Args {
    /// PDF to ingest (overrides PDF_PATH).
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Delete the collection before ingesting, instead of appending to it.
    #[arg(long)]
    reset: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("ingest=info,pdf_rag=info");

    let args = Args::parse();

    let mut config = AppConfig::load().context("Invalid configuration")?;
    if let Some(pdf) = args.pdf {
        config.ingestion.pdf_path = Some(pdf);
    }
    let pdf_path = config.require_pdf_path()?.to_path_buf();

    let vector_store = Arc::new(
        QdrantVectorStore::from_config(&config.vector_store)
            .context("Failed to create the Qdrant client")?,
    );
    let service = IngestionService::new(
        Arc::new(PdfLoader::new()),
        Arc::new(TextEmbedding::from_config(&config.embedding)),
        vector_store,
    )
    .with_chunking(config.chunking);

    let report = if args.reset {
        service.replace(&pdf_path).await
    } else {
        service.ingest(&pdf_path).await
    }
    .with_context(|| format!("Failed to ingest {}", pdf_path.display()))?;
    let stored = service.stored_chunks().await?;

    info!(
        source = %report.source,
        pages = report.pages,
        chunks = report.chunks,
        stored,
        collection = %config.vector_store.collection,
        "ingestion completed"
    );
    println!(
        "Ingested {} chunks from {} ({} pages) into collection '{}' ({} chunks stored).",
        report.chunks, report.source, report.pages, config.vector_store.collection, stored
    );

    Ok(())
}
