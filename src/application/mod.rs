//! Application layer - Use cases and orchestration.
//!
//! Services depend on domain ports (traits) rather than concrete
//! implementations: ingestion turns a PDF into stored chunks, the RAG service
//! turns a question into an answer.

pub mod services;

pub use services::{IngestionReport, IngestionService, RagService};
