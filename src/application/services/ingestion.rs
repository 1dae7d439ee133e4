use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    chunk_pages,
    ports::{DocumentLoader, EmbeddingService, VectorStore},
    ChunkingConfig, DocumentChunk, DomainError, Embedding,
};

/// Outcome of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionReport {
    pub source: String,
    pub pages: usize,
    pub chunks: usize,
}

/// Loads a PDF, chunks it, embeds every chunk and writes it to the store.
///
/// Every run writes fresh chunk ids, so ingesting the same file twice
/// duplicates its chunks; [`IngestionService::replace`] swaps them instead.
pub struct IngestionService {
    loader: Arc<dyn DocumentLoader>,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    chunking: ChunkingConfig,
}

impl IngestionService {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            loader,
            embedding,
            vector_store,
            chunking: ChunkingConfig::default(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Appends the chunks of `path` to the store.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn ingest(&self, path: &Path) -> Result<IngestionReport, DomainError> {
        self.run(path, false).await
    }

    /// Replaces the stored chunks with those of `path`.
    ///
    /// The store is only cleared once the document has been read, chunked and
    /// embedded, so a bad file leaves the existing collection untouched.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn replace(&self, path: &Path) -> Result<IngestionReport, DomainError> {
        self.run(path, true).await
    }

    async fn run(&self, path: &Path, reset: bool) -> Result<IngestionReport, DomainError> {
        let pages = self.loader.load_pages(path).await?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let chunks = chunk_pages(&pages, &source, self.chunking);
        if chunks.is_empty() {
            return Err(DomainError::document(format!(
                "no text could be extracted from {}",
                path.display()
            )));
        }
        tracing::info!(pages = pages.len(), chunks = chunks.len(), "document split");

        let embeddings = self.embed_chunks(&chunks).await?;
        if reset {
            self.reset().await?;
        }
        self.vector_store.upsert_batch(&chunks, &embeddings).await?;

        Ok(IngestionReport {
            source,
            pages: pages.len(),
            chunks: chunks.len(),
        })
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len(), model = self.embedding.model()))]
    async fn embed_chunks(&self, chunks: &[DocumentChunk]) -> Result<Vec<Embedding>, DomainError> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(DomainError::external(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        Ok(embeddings)
    }

    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<(), DomainError> {
        self.vector_store.clear().await
    }

    pub async fn stored_chunks(&self) -> Result<u64, DomainError> {
        self.vector_store.count().await
    }
}
