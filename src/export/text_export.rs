use std::fmt::{self, Write as _};
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::export::Exporter;
use crate::pipeline::BatchOutcome;

#[derive(Debug, Clone)]
pub struct TextExporter {
    out_dir: PathBuf,
}

impl TextExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join("return.txt")
    }
}

/// Human-readable report of one batch.
pub fn render_report(outcome: &BatchOutcome) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, outcome);
    out
}

fn write_report(out: &mut String, outcome: &BatchOutcome) -> fmt::Result {
    for doc in &outcome.documents {
        writeln!(out, "=== {} ({}) ===", doc.filename, doc.form_type)?;
        for (name, value) in doc.fields.iter() {
            writeln!(out, "  {name:<48} {}", value.as_str())?;
        }
        let missing = doc.missing_fields();
        if !missing.is_empty() {
            writeln!(out, "  missing: {}", missing.join(", "))?;
        }
        for note in &doc.notes {
            writeln!(out, "  note: {note}")?;
        }
        writeln!(out)?;
    }

    let summary = &outcome.summary;
    writeln!(out, "=== Summary ===")?;
    write_amount(out, "W-2 wages", summary.income.w2_wages)?;
    write_amount(out, "1099-INT interest", summary.income.int_interest)?;
    write_amount(out, "1099-NEC compensation", summary.income.nec_nonemployee_comp)?;
    write_amount(out, "Federal withholding", summary.withholding.federal)?;
    for fault in &summary.faults {
        writeln!(
            out,
            "  warning: {} field {} value '{}' counted as zero",
            fault.filename, fault.field, fault.raw
        )?;
    }
    writeln!(out)?;

    let tax = &outcome.tax;
    writeln!(out, "=== Federal tax ({}) ===", outcome.filing_status)?;
    write_amount(out, "AGI", tax.agi)?;
    write_amount(out, "Standard deduction", tax.standard_deduction)?;
    write_amount(out, "Taxable income", tax.taxable_income)?;
    write_amount(out, "Estimated tax", tax.estimated_tax)?;
    write_amount(out, "Withholding", tax.withholding)?;
    write_amount(out, "Balance due", tax.balance_due)?;
    write_amount(out, "Refund", tax.refund)
}

fn write_amount(out: &mut String, label: &str, amount: f64) -> fmt::Result {
    writeln!(out, "  {:<28}{amount:>12.2}", format!("{label}:"))
}

impl Exporter for TextExporter {
    fn export(&self, outcome: &BatchOutcome) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
        fs::write(self.path(), render_report(outcome))
            .with_context(|| format!("Failed to write {}", self.path().display()))?;
        Ok(())
    }
}
