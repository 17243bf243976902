pub mod layout_builder;
pub mod pdf_reader;
pub mod text_extractor;

pub use layout_builder::{PageWords, PopplerWordSource, WordBox};
pub use pdf_reader::{ContentStreamStage, PdfReader};
pub use text_extractor::PopplerTextStage;

use anyhow::Result;

use crate::text::ScratchPdf;

/// Positioned words for every page of a document.
pub trait WordSource {
    fn page_words(&self, pdf: &ScratchPdf<'_>) -> Result<Vec<PageWords>>;
}
