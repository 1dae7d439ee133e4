use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Characters shared by two consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// Plain text extracted from one page of a PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfPage {
    /// 1-based page number.
    pub number: usize,
    pub text: String,
}

impl PdfPage {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub content: String,
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    pub fn new(content: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            chunk_index,
            metadata: ChunkMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// File name of the PDF the chunk was cut from.
    pub source: Option<String>,
    /// Page on which the chunk starts.
    pub page: Option<usize>,
    pub ingested_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

/// A window of the source text, with its start offset in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    pub text: String,
    pub start: usize,
}

/// Splits text into fixed-size windows of at most `chunk_size` characters.
///
/// Window `i` starts at `i * (chunk_size - overlap)`, so two consecutive
/// windows always share exactly `overlap` characters. The walk stops at the
/// first window that reaches the end of the text; only that last window may be
/// shorter than `chunk_size`. Whitespace-only input yields nothing.
///
/// Sizes are counted in `char`s, never bytes, so multi-byte text is never cut
/// inside a code point.
pub fn sliding_window(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextWindow> {
    if chunk_size == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut windows = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        windows.push(TextWindow {
            text: chars[start..end].iter().collect(),
            start,
        });

        if end == chars.len() {
            break;
        }
        start += step;
    }

    windows
}

/// Concatenates the pages of a document and cuts the result into chunks.
///
/// Pages are joined with a newline. Each chunk is tagged with `source` and the
/// number of the page holding its first character.
pub fn chunk_pages(pages: &[PdfPage], source: &str, config: ChunkingConfig) -> Vec<DocumentChunk> {
    let mut text = String::new();
    let mut page_starts: Vec<(usize, usize)> = Vec::with_capacity(pages.len());
    let mut offset = 0;

    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            text.push('\n');
            offset += 1;
        }
        page_starts.push((offset, page.number));
        text.push_str(&page.text);
        offset += page.text.chars().count();
    }

    let ingested_at = Utc::now();

    sliding_window(&text, config.chunk_size, config.chunk_overlap)
        .into_iter()
        .enumerate()
        .map(|(index, window)| {
            let page = page_at(&page_starts, window.start);
            DocumentChunk::new(window.text, index).with_metadata(ChunkMetadata {
                source: Some(source.to_string()),
                page,
                ingested_at: Some(ingested_at),
            })
        })
        .collect()
}

fn page_at(page_starts: &[(usize, usize)], offset: usize) -> Option<usize> {
    let idx = page_starts.partition_point(|(start, _)| *start <= offset);
    idx.checked_sub(1).map(|i| page_starts[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlap_of(a: &str, b: &str, overlap: usize) -> bool {
        let tail: String = a.chars().skip(a.chars().count() - overlap).collect();
        let head: String = b.chars().take(overlap).collect();
        tail == head
    }

    #[test]
    fn test_sliding_window_short_text_is_single_chunk() {
        let windows = sliding_window("Hello world.", 100, 10);

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].text, "Hello world.");
        assert_eq!(windows[0].start, 0);
    }

    #[test]
    fn test_sliding_window_respects_size_and_overlap() {
        let text: String = (0..2_345).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let windows = sliding_window(&text, 1000, 150);

        assert!(windows.iter().all(|w| w.text.chars().count() <= 1000));
        for pair in windows.windows(2) {
            assert_eq!(pair[1].start - pair[0].start, 850);
            assert!(overlap_of(&pair[0].text, &pair[1].text, 150));
        }
        let last = windows.last().unwrap();
        assert_eq!(last.start + last.text.chars().count(), 2_345);
    }

    #[test]
    fn test_sliding_window_counts_chars_not_bytes() {
        let text = "ção".repeat(20);
        let windows = sliding_window(&text, 7, 2);

        assert!(windows.iter().all(|w| w.text.chars().count() <= 7));
        for pair in windows.windows(2) {
            assert!(overlap_of(&pair[0].text, &pair[1].text, 2));
        }
    }

    #[test]
    fn test_sliding_window_empty() {
        assert!(sliding_window("", 100, 10).is_empty());
        assert!(sliding_window(" \n\t ", 100, 10).is_empty());
    }

    #[test]
    fn test_chunk_pages_tracks_start_page() {
        let pages = vec![
            PdfPage::new(1, "a".repeat(10)),
            PdfPage::new(2, "b".repeat(10)),
        ];
        let config = ChunkingConfig {
            chunk_size: 8,
            chunk_overlap: 2,
        };
        let chunks = chunk_pages(&pages, "report.pdf", config);

        // starts: 0, 6, 12, 18 over 21 chars ("a"*10 + "\n" + "b"*10)
        assert_eq!(chunks.len(), 4);
        let pages: Vec<_> = chunks.iter().map(|c| c.metadata.page).collect();
        assert_eq!(pages, vec![Some(1), Some(1), Some(2), Some(2)]);
        assert!(chunks
            .iter()
            .all(|c| c.metadata.source.as_deref() == Some("report.pdf")));
        let indexes: Vec<_> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_chunk_pages_without_text() {
        let pages = vec![PdfPage::new(1, ""), PdfPage::new(2, "   ")];
        assert!(chunk_pages(&pages, "blank.pdf", ChunkingConfig::default()).is_empty());
    }
}
