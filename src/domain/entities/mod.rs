mod document;
mod embedding;

pub use document::{
    chunk_pages, sliding_window, ChunkMetadata, ChunkingConfig, DocumentChunk, PdfPage,
    SearchResult, TextWindow, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
};
pub use embedding::Embedding;
