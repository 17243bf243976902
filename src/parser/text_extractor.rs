use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};

use crate::core::model::TextStageKind;
use crate::text::{ScratchPdf, TextStage};

/// Structured reader backed by poppler's `pdftotext -layout`, which keeps a
/// natural reading order per page.
#[derive(Debug, Clone)]
pub struct PopplerTextStage {
    binary: PathBuf,
}

impl PopplerTextStage {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl Default for PopplerTextStage {
    fn default() -> Self {
        Self::new(PathBuf::from("pdftotext"))
    }
}

impl TextStage for PopplerTextStage {
    fn kind(&self) -> TextStageKind {
        TextStageKind::Structured
    }

    fn extract(&self, pdf: &ScratchPdf<'_>) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("-layout")
            .arg("-enc")
            .arg("UTF-8")
            .arg(pdf.path())
            .arg("-")
            .output()
            .with_context(|| {
                format!(
                    "failed to invoke {}; is poppler-utils installed?",
                    self.binary.display()
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pdftotext failed with status {}: {stderr}", output.status);
        }

        // pdftotext separates pages with form feeds
        Ok(String::from_utf8_lossy(&output.stdout).replace('\u{c}', "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_an_error() {
        let pdf = ScratchPdf::new(b"%PDF-1.4").unwrap();
        let stage = PopplerTextStage::new(PathBuf::from("/nonexistent/pdftotext"));
        assert!(stage.extract(&pdf).is_err());
    }
}
