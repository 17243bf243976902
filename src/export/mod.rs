pub mod json_export;
pub mod text_export;

use std::path::Path;

use anyhow::Result;

use crate::pipeline::BatchOutcome;

pub use json_export::JsonExporter;
pub use text_export::{render_report, TextExporter};

pub trait Exporter {
    fn export(&self, outcome: &BatchOutcome) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

pub fn export_outcome(outcome: &BatchOutcome, out_dir: &Path, formats: &[OutputFormat]) -> Result<()> {
    for format in formats {
        let exporter: Box<dyn Exporter> = match format {
            OutputFormat::Json => Box::new(JsonExporter::new(out_dir.to_path_buf())),
            OutputFormat::Text => Box::new(TextExporter::new(out_dir.to_path_buf())),
        };
        exporter.export(outcome)?;
    }
    Ok(())
}
