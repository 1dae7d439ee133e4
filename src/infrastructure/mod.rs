pub mod config;
pub mod embedding;
pub mod llm;
pub mod loader;
pub mod telemetry;
pub mod vector_store;

pub use config::{AppConfig, EmbeddingConfig, LlmConfig, VectorStoreConfig};
pub use embedding::TextEmbedding;
pub use llm::OpenAiLlm;
pub use loader::PdfLoader;
pub use telemetry::init_tracing;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
