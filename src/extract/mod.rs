pub mod fixture;
pub mod payer;
pub mod profile;
pub mod wage;

pub use fixture::FixtureExtractor;
pub use payer::PayerStatementExtractor;
pub use profile::{AssignmentPolicy, IdentityRule, LayoutProfile};
pub use wage::WageStatementExtractor;

use std::path::PathBuf;

use crate::config::{ExtractConfig, ExtractorMode};
use crate::core::model::{DocumentType, ParsedDocument};
use crate::error::ConfigError;
use crate::parser::PopplerWordSource;
use crate::text::ScratchPdf;

pub const SSN_PATTERN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
pub const EIN_PATTERN: &str = r"\b\d{2}-\d{7}\b";

/// What an extractor gets to look at for one document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInput<'a> {
    pub filename: &'a str,
    pub bytes: &'a [u8],
    /// Accepted output of the text extractor; may be empty.
    pub text: &'a str,
    /// Scratch copy already written for the text stages, when there is one.
    pub pdf: Option<&'a ScratchPdf<'a>>,
}

/// Turns one document into a fixed field schema. Never fails: anything that
/// cannot be located is left `missing`.
pub trait FieldExtractor {
    fn form_type(&self) -> DocumentType;
    fn extract(&self, input: &DocumentInput<'_>) -> ParsedDocument;
}

pub type BoxedExtractor = Box<dyn FieldExtractor + Send + Sync>;

pub struct ExtractorSet {
    wage: BoxedExtractor,
    interest: BoxedExtractor,
    compensation: BoxedExtractor,
}

impl ExtractorSet {
    pub fn new(wage: BoxedExtractor, interest: BoxedExtractor, compensation: BoxedExtractor) -> Self {
        Self {
            wage,
            interest,
            compensation,
        }
    }

    pub fn from_config(config: &ExtractConfig, pdftotext: PathBuf) -> Result<Self, ConfigError> {
        let words = Box::new(PopplerWordSource::new(pdftotext));
        let wage: BoxedExtractor = Box::new(WageStatementExtractor::from_config(config, words)?);

        let (interest, compensation) = match config.mode {
            ExtractorMode::Positional => (
                Box::new(PayerStatementExtractor::interest().with_anchors(config)?) as BoxedExtractor,
                Box::new(PayerStatementExtractor::compensation().with_anchors(config)?) as BoxedExtractor,
            ),
            ExtractorMode::Fixture => {
                log::warn!("using fixture extractors for 1099 forms; values are static");
                (
                    Box::new(FixtureExtractor::interest()) as BoxedExtractor,
                    Box::new(FixtureExtractor::compensation()) as BoxedExtractor,
                )
            }
        };

        Ok(Self::new(wage, interest, compensation))
    }

    pub fn for_type(&self, form_type: DocumentType) -> &(dyn FieldExtractor + Send + Sync) {
        match form_type {
            DocumentType::WageStatement => self.wage.as_ref(),
            DocumentType::InterestStatement => self.interest.as_ref(),
            DocumentType::CompensationStatement => self.compensation.as_ref(),
        }
    }
}
