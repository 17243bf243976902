//! Layered text extraction: structured reader, raw content streams, then OCR.
//!
//! A stage runs only while the text gathered so far looks empty. Stage
//! failures are logged and treated as producing no text.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::config::TextConfig;
use crate::core::model::{ExtractedText, TextStageKind};
use crate::ocr::OcrStage;
use crate::parser::{ContentStreamStage, PopplerTextStage};

/// A document's bytes, also written to a scratch file for the external tools.
/// The directory is removed when this value is dropped.
#[derive(Debug)]
pub struct ScratchPdf<'a> {
    bytes: &'a [u8],
    dir: TempDir,
    path: PathBuf,
}

impl<'a> ScratchPdf<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("taxdoc-")
            .tempdir()
            .context("failed to create scratch directory")?;
        let path = dir.path().join("document.pdf");
        fs::write(&path, bytes)
            .with_context(|| format!("failed to write scratch pdf {}", path.display()))?;
        Ok(Self { bytes, dir, path })
    }

    pub fn bytes(&self) -> &[u8] {
        self.bytes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory for intermediate files such as rendered pages.
    pub fn work_dir(&self) -> &Path {
        self.dir.path()
    }
}

pub trait TextStage {
    fn kind(&self) -> TextStageKind;
    fn extract(&self, pdf: &ScratchPdf<'_>) -> Result<String>;

    /// Whether this stage's output replaces earlier partial text instead of
    /// being appended to it.
    fn replaces_previous(&self) -> bool {
        false
    }
}

pub type BoxedStage = Box<dyn TextStage + Send + Sync>;

pub fn non_whitespace_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

pub struct TextExtractor {
    stages: Vec<BoxedStage>,
    min_content_chars: usize,
}

impl TextExtractor {
    pub fn new(stages: Vec<BoxedStage>, min_content_chars: usize) -> Self {
        Self {
            stages,
            min_content_chars,
        }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        let stages = config
            .stages
            .iter()
            .map(|kind| -> BoxedStage {
                match kind {
                    TextStageKind::Structured => {
                        Box::new(PopplerTextStage::new(config.pdftotext.clone()))
                    }
                    TextStageKind::ContentStream => Box::new(ContentStreamStage::new()),
                    TextStageKind::Ocr => Box::new(OcrStage::from_config(config)),
                }
            })
            .collect();
        Self::new(stages, config.min_content_chars)
    }

    fn looks_empty(&self, text: &str) -> bool {
        non_whitespace_len(text) < self.min_content_chars
    }

    pub fn extract_text(&self, bytes: &[u8]) -> ExtractedText {
        match ScratchPdf::new(bytes) {
            Ok(pdf) => self.extract_from(&pdf),
            Err(err) => {
                log::warn!("text extraction skipped: {err:#}");
                ExtractedText::empty()
            }
        }
    }

    pub fn extract_from(&self, pdf: &ScratchPdf<'_>) -> ExtractedText {
        let mut text = String::new();

        for stage in &self.stages {
            if !self.looks_empty(&text) {
                break;
            }
            log::debug!("trying {} text stage", stage.kind());
            let output = match stage.extract(pdf) {
                Ok(output) => output,
                Err(err) => {
                    log::warn!("{} text stage failed: {err:#}", stage.kind());
                    String::new()
                }
            };
            if stage.replaces_previous() {
                text = output;
            } else {
                text.push_str(&output);
            }
            if !self.looks_empty(&text) {
                return ExtractedText {
                    text,
                    stage: Some(stage.kind()),
                };
            }
        }

        ExtractedText { text, stage: None }
    }
}
