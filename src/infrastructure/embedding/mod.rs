mod text;

pub use text::{TextEmbedding, DEFAULT_EMBEDDING_MODEL};
