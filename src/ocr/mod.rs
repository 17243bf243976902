pub mod bridge;
pub mod renderer;

pub use bridge::OcrBridge;
pub use renderer::{PageRenderer, RenderedPage};

use anyhow::Result;

use crate::config::TextConfig;
use crate::core::model::TextStageKind;
use crate::text::{ScratchPdf, TextStage};

/// Last-resort stage: rasterize each page and recognize it.
#[derive(Debug, Clone)]
pub struct OcrStage {
    renderer: PageRenderer,
    bridge: OcrBridge,
}

impl OcrStage {
    pub fn new(renderer: PageRenderer, bridge: OcrBridge) -> Self {
        Self { renderer, bridge }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        let renderer = PageRenderer::new(config.pdftoppm.clone(), config.ocr_dpi);
        let bridge = OcrBridge::new(config.tesseract.clone())
            .with_lang(config.ocr_lang.clone())
            .with_modes(config.ocr_oem, config.ocr_psm);
        Self::new(renderer, bridge)
    }
}

impl TextStage for OcrStage {
    fn kind(&self) -> TextStageKind {
        TextStageKind::Ocr
    }

    fn extract(&self, pdf: &ScratchPdf<'_>) -> Result<String> {
        let pages = self
            .renderer
            .render_pages(pdf.path(), &pdf.work_dir().join("ocr"))?;
        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.bridge.run(&page.path)?);
            text.push('\n');
        }
        Ok(text)
    }

    fn replaces_previous(&self) -> bool {
        true
    }
}
