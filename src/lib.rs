//! Question answering over a single PDF with retrieval-augmented generation.
//!
//! Ingestion splits the PDF into overlapping chunks, embeds them and stores
//! them in a Qdrant collection. At query time the question is embedded with
//! the same model, the nearest chunks are pulled back and a chat model answers
//! from that context only.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
