#![allow(dead_code)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pdf_rag::application::{IngestionService, RagService};
use pdf_rag::domain::ports::{DocumentLoader, EmbeddingService, LlmService};
use pdf_rag::domain::{ChunkingConfig, DomainError, Embedding, PdfPage};
use pdf_rag::infrastructure::InMemoryVectorStore;

const DIMENSION: usize = 32;

/// Bag-of-words vectors: texts sharing words end up close together.
#[derive(Default)]
pub struct WordEmbedding {
    pub calls: AtomicUsize,
}

impl WordEmbedding {
    fn vector(text: &str) -> Embedding {
        let mut v = vec![0.0f32; DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(0usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize))
                % DIMENSION;
            v[bucket] += 1.0;
        }
        Embedding::new(v)
    }
}

#[async_trait]
impl EmbeddingService for WordEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model(&self) -> &str {
        "word-bag"
    }
}

pub struct FailingEmbedding;

#[async_trait]
impl EmbeddingService for FailingEmbedding {
    async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
        Err(DomainError::external("rate limited"))
    }

    async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        Err(DomainError::external("rate limited"))
    }

    fn model(&self) -> &str {
        "failing"
    }
}

/// Records every prompt and replies with a fixed answer.
pub struct RecordingLlm {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for RecordingLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(DomainError::external)
    }
}

pub struct StaticLoader {
    pages: Option<Vec<PdfPage>>,
}

impl StaticLoader {
    pub fn with_pages(pages: Vec<PdfPage>) -> Self {
        Self { pages: Some(pages) }
    }

    pub fn unreadable() -> Self {
        Self { pages: None }
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load_pages(&self, path: &Path) -> Result<Vec<PdfPage>, DomainError> {
        self.pages
            .clone()
            .ok_or_else(|| DomainError::document(format!("cannot read {}", path.display())))
    }
}

pub fn sample_pages() -> Vec<PdfPage> {
    vec![
        PdfPage::new(
            1,
            "The warranty covers manufacturing defects for two years from the date of purchase. \
             Damage caused by misuse is not covered by the warranty.",
        ),
        PdfPage::new(
            2,
            "To reset the router, hold the reset button for ten seconds until the lights blink. \
             The router then restarts with factory settings.",
        ),
        PdfPage::new(
            3,
            "Support is available by email on weekdays. Replies are sent within one business day.",
        ),
    ]
}

pub fn small_chunks() -> ChunkingConfig {
    ChunkingConfig {
        chunk_size: 80,
        chunk_overlap: 20,
    }
}

pub struct Harness {
    pub store: Arc<InMemoryVectorStore>,
    pub embedding: Arc<WordEmbedding>,
    pub llm: Arc<RecordingLlm>,
}

impl Harness {
    pub fn new(llm: RecordingLlm) -> Self {
        Self {
            store: Arc::new(InMemoryVectorStore::new()),
            embedding: Arc::new(WordEmbedding::default()),
            llm: Arc::new(llm),
        }
    }

    pub fn ingestion(&self, loader: StaticLoader) -> IngestionService {
        IngestionService::new(Arc::new(loader), self.embedding.clone(), self.store.clone())
            .with_chunking(small_chunks())
    }

    pub fn rag(&self, top_k: usize) -> RagService {
        RagService::new(
            self.embedding.clone(),
            self.store.clone(),
            self.llm.clone(),
            top_k,
        )
    }
}
