use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::model::TextStageKind;
use crate::error::ConfigError;

pub const DEFAULT_MIN_CONTENT_CHARS: usize = 20;
pub const DEFAULT_OCR_DPI: u32 = 450;

/// Two-letter postal codes recognised on W-2 state lines.
pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub text: TextConfig,
    pub extract: ExtractConfig,
    pub tax: TaxConfig,
    pub pipeline: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub min_content_chars: usize,
    pub pdftotext: PathBuf,
    pub pdftoppm: PathBuf,
    pub tesseract: PathBuf,
    pub ocr_dpi: u32,
    pub ocr_lang: String,
    pub ocr_psm: u8,
    pub ocr_oem: u8,
    pub stages: Vec<TextStageKind>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            pdftotext: PathBuf::from("pdftotext"),
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
            ocr_dpi: DEFAULT_OCR_DPI,
            ocr_lang: "eng".to_string(),
            ocr_psm: 4,
            ocr_oem: 1,
            stages: vec![
                TextStageKind::Structured,
                TextStageKind::ContentStream,
                TextStageKind::Ocr,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorMode {
    #[default]
    Positional,
    /// Static demo tables for 1099 forms.
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub mode: ExtractorMode,
    pub state_codes: Vec<String>,
    pub other_withholding_keywords: Vec<String>,
    pub employer_anchor: Option<String>,
    pub employee_anchor: Option<String>,
    pub payer_anchor: Option<String>,
    pub recipient_anchor: Option<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Positional,
            state_codes: US_STATE_CODES.iter().map(|c| c.to_string()).collect(),
            other_withholding_keywords: vec!["CASDI".to_string(), "SDI".to_string()],
            employer_anchor: None,
            employee_anchor: None,
            payer_anchor: None,
            recipient_anchor: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    pub table_path: Option<PathBuf>,
    pub filing_status: String,
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self {
            table_path: None,
            filing_status: "single".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl AppConfig {
    /// Defaults when `path` is `None`; a named file must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.text.min_content_chars, 20);
        assert_eq!(config.text.ocr_dpi, 450);
        assert_eq!(config.text.stages.len(), 3);
        assert_eq!(config.extract.mode, ExtractorMode::Positional);
        assert!(config.extract.state_codes.iter().any(|c| c == "CA"));
        assert_eq!(config.tax.filing_status, "single");
        assert!(config.pipeline.parallel);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let raw = r#"
            [text]
            ocr_dpi = 300
            stages = ["content_stream"]

            [extract]
            mode = "fixture"
            state_codes = ["MI"]
        "#;
        let config = AppConfig::from_toml(raw).unwrap();
        assert_eq!(config.text.ocr_dpi, 300);
        assert_eq!(config.text.min_content_chars, 20);
        assert_eq!(config.text.stages, vec![TextStageKind::ContentStream]);
        assert_eq!(config.extract.mode, ExtractorMode::Fixture);
        assert_eq!(config.extract.state_codes, vec!["MI".to_string()]);
        assert_eq!(config.extract.other_withholding_keywords.len(), 2);
    }

    #[test]
    fn rejects_unknown_stage() {
        assert!(AppConfig::from_toml("[text]\nstages = [\"magic\"]").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/taxdoc.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
