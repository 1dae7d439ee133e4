use async_trait::async_trait;
use rig::loaders::PdfFileLoader;
use std::path::Path;

use crate::domain::{ports::DocumentLoader, DomainError, PdfPage};

/// Extracts page text from a PDF on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load_pages(&self, path: &Path) -> Result<Vec<PdfPage>, DomainError> {
        if !path.is_file() {
            return Err(DomainError::document(format!(
                "PDF not found: {}",
                path.display()
            )));
        }
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::document(format!("failed to read {}: {e}", path.display()))
        })?;

        let document = PdfFileLoader::from_bytes(bytes)
            .load()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::document(format!("PDF not found: {}", path.display())))?
            .map_err(|e| {
                DomainError::document(format!("failed to parse {}: {e}", path.display()))
            })?;

        // lopdf numbers pages from 1
        let pages = document
            .page_iter()
            .enumerate()
            .map(|(i, _)| {
                let number = i + 1;
                document
                    .extract_text(&[number as u32])
                    .map(|text| PdfPage::new(number, text))
                    .map_err(|e| {
                        DomainError::document(format!(
                            "failed to extract page {number} of {}: {e}",
                            path.display()
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(path = %path.display(), pages = pages.len(), "pdf loaded");
        Ok(pages)
    }
}
