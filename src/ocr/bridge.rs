use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

/// Runs the tesseract CLI on a single page image.
#[derive(Debug, Clone)]
pub struct OcrBridge {
    binary: PathBuf,
    lang: String,
    oem: u8,
    psm: u8,
}

impl OcrBridge {
    pub fn new(binary: PathBuf) -> Self {
        Self {
            binary,
            lang: "eng".to_string(),
            oem: 1,
            psm: 4,
        }
    }

    pub fn with_lang(mut self, lang: String) -> Self {
        self.lang = lang;
        self
    }

    /// `psm` 4 treats the page as a single column of variable-size lines.
    pub fn with_modes(mut self, oem: u8, psm: u8) -> Self {
        self.oem = oem;
        self.psm = psm;
        self
    }

    pub fn args(&self, image_path: &Path) -> Vec<String> {
        vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.lang.clone(),
            "--oem".to_string(),
            self.oem.to_string(),
            "--psm".to_string(),
            self.psm.to_string(),
        ]
    }

    pub fn run(&self, image_path: &Path) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(self.args(image_path))
            .output()
            .with_context(|| format!("failed to invoke {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("tesseract failed: {stderr}");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
