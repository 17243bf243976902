use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::classify::{classify, has_wage_marker, normalize_text};
use crate::config::AppConfig;
use crate::core::model::{
    DocumentType, IncomeComponents, ParsedDocument, RawDocument, Summary, TaxResult,
};
use crate::extract::{DocumentInput, ExtractorSet};
use crate::form1040::{Form1040Lines, Identity};
use crate::tax::{FilingStatus, TaxCalculator, TaxTable};
use crate::text::{ScratchPdf, TextExtractor};

/// Everything one batch produces, documents in upload order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub filing_status: FilingStatus,
    pub documents: Vec<ParsedDocument>,
    pub summary: Summary,
    pub tax: TaxResult,
    pub form1040: Form1040Lines,
}

pub struct Pipeline {
    text: TextExtractor,
    extractors: ExtractorSet,
    calculator: TaxCalculator,
    parallel: bool,
}

impl Pipeline {
    pub fn new(text: TextExtractor, extractors: ExtractorSet, calculator: TaxCalculator) -> Self {
        Self {
            text,
            extractors,
            calculator,
            parallel: true,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let text = TextExtractor::from_config(&config.text);
        let extractors = ExtractorSet::from_config(&config.extract, config.text.pdftotext.clone())
            .context("Failed to build field extractors")?;
        let table = match &config.tax.table_path {
            Some(path) => TaxTable::from_path(path)
                .with_context(|| format!("Failed to load tax table {}", path.display()))?,
            None => TaxTable::tax_year_2024().context("Bundled tax table is invalid")?,
        };
        Ok(Self::new(text, extractors, TaxCalculator::new(table)).with_parallel(config.pipeline.parallel))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn process_document(&self, document: &RawDocument) -> ParsedDocument {
        let scratch = match ScratchPdf::new(&document.bytes) {
            Ok(pdf) => Some(pdf),
            Err(err) => {
                log::warn!("{}: no scratch copy, text extraction skipped: {err:#}", document.filename);
                None
            }
        };
        let extracted = scratch
            .as_ref()
            .map(|pdf| self.text.extract_from(pdf))
            .unwrap_or_default();
        let normalized = normalize_text(&extracted.text);
        let form_type = classify(&normalized);
        log::info!("{}: classified as {form_type}", document.filename);

        let input = DocumentInput {
            filename: &document.filename,
            bytes: &document.bytes,
            text: &extracted.text,
            pdf: scratch.as_ref(),
        };
        let mut parsed = self.extractors.for_type(form_type).extract(&input);

        match extracted.stage {
            Some(stage) => parsed.notes.push(format!("Text accepted from {stage} stage")),
            None => parsed.notes.push("No text recovered from any stage".to_string()),
        }
        if form_type == DocumentType::WageStatement && !has_wage_marker(&normalized) {
            log::info!("{}: no form marker found, classified by default", document.filename);
            parsed
                .notes
                .push("No form marker found; classified by default as W-2".to_string());
        }

        parsed
    }

    pub fn process_documents(&self, documents: &[RawDocument]) -> Vec<ParsedDocument> {
        if self.parallel {
            documents
                .par_iter()
                .map(|doc| self.process_document(doc))
                .collect()
        } else {
            documents.iter().map(|doc| self.process_document(doc)).collect()
        }
    }

    pub fn process_batch(&self, documents: &[RawDocument], identity: &Identity) -> BatchOutcome {
        let parsed = self.process_documents(documents);
        let summary = aggregate(&parsed);
        let tax = self.calculator.compute(
            &IncomeComponents::from(&summary.income),
            summary.withholding.federal,
            identity.filing_status,
        );
        let form1040 = Form1040Lines::build(&parsed, &tax, identity);

        BatchOutcome {
            filing_status: identity.filing_status,
            documents: parsed,
            summary,
            tax,
            form1040,
        }
    }
}

pub fn load_documents(paths: &[impl AsRef<Path>]) -> Result<Vec<RawDocument>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(RawDocument::new(filename, bytes))
        })
        .collect()
}
