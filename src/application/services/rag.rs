use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    format_context,
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError, PromptTemplate, SearchResult, NO_INFORMATION_ANSWER,
};

/// Retrieve-then-answer over one collection.
///
/// The embedding service must be the same one used to ingest the collection,
/// otherwise the similarity scores are meaningless.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    template: PromptTemplate,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            template: PromptTemplate::default(),
            default_top_k,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_top_k(query, self.default_top_k).await
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.vector_store.search(&embedding, top_k).await
    }

    /// Builds the prompt for `question` from an already retrieved result set.
    pub fn build_prompt(&self, question: &str, results: &[SearchResult]) -> String {
        self.template.render(&format_context(results), question)
    }

    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<String, DomainError> {
        self.answer_top_k(question, self.default_top_k).await
    }

    /// Answers from the `top_k` closest chunks.
    ///
    /// An empty result set still goes to the model; the template tells it to
    /// decline when the context does not cover the question.
    #[instrument(skip(self))]
    pub async fn answer_top_k(&self, question: &str, top_k: usize) -> Result<String, DomainError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }

        let results = self.retrieve_top_k(question, top_k).await?;
        if results.is_empty() {
            tracing::debug!("no chunks retrieved");
        }
        for (rank, r) in results.iter().enumerate() {
            tracing::debug!(
                rank = rank + 1,
                score = r.score,
                page = ?r.chunk.metadata.page,
                chunk_index = r.chunk.chunk_index,
                "retrieved chunk"
            );
        }

        let prompt = self.build_prompt(question, &results);
        let answer = self.llm.complete(&prompt).await?;

        if answer.trim().is_empty() {
            tracing::warn!("model returned an empty answer");
            return Ok(NO_INFORMATION_ANSWER.to_string());
        }
        Ok(answer)
    }
}
