use crate::domain::{errors::DomainError, PdfPage};
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Extracts the text of every page, in page order.
    async fn load_pages(&self, path: &Path) -> Result<Vec<PdfPage>, DomainError>;
}
