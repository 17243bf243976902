use anyhow::{Context, Result};
use lopdf::Document;

use crate::core::model::TextStageKind;
use crate::text::{ScratchPdf, TextStage};

/// In-memory view of a PDF, parsed with lopdf.
#[derive(Debug)]
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes).context("failed to parse pdf structure")?;
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Text of each page straight from its content stream. Pages that fail to
    /// decode are skipped.
    pub fn page_texts(&self) -> Vec<String> {
        self.document
            .get_pages()
            .keys()
            .filter_map(|page_number| match self.document.extract_text(&[*page_number]) {
                Ok(text) => Some(text),
                Err(err) => {
                    log::debug!("page {page_number}: content stream not decodable: {err}");
                    None
                }
            })
            .collect()
    }
}

/// Raw content-stream reader. Ignores layout, works without poppler.
#[derive(Debug, Default)]
pub struct ContentStreamStage;

impl ContentStreamStage {
    pub fn new() -> Self {
        Self
    }
}

impl TextStage for ContentStreamStage {
    fn kind(&self) -> TextStageKind {
        TextStageKind::ContentStream
    }

    fn extract(&self, pdf: &ScratchPdf<'_>) -> Result<String> {
        let reader = PdfReader::from_bytes(pdf.bytes())?;
        Ok(reader.page_texts().concat())
    }
}
