use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::export::Exporter;
use crate::pipeline::BatchOutcome;

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.out_dir.join("return.json")
    }
}

impl Exporter for JsonExporter {
    fn export(&self, outcome: &BatchOutcome) -> Result<()> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("Failed to create {}", self.out_dir.display()))?;
        let data = serde_json::to_string_pretty(outcome)?;
        fs::write(self.path(), data)
            .with_context(|| format!("Failed to write {}", self.path().display()))?;
        Ok(())
    }
}
