use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Rasterizes every page of a PDF to PNG with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    binary: PathBuf,
    dpi: u32,
}

impl PageRenderer {
    pub fn new(binary: PathBuf, dpi: u32) -> Self {
        Self { binary, dpi }
    }

    pub fn render_pages(&self, pdf_path: &Path, out_dir: &Path) -> Result<Vec<RenderedPage>> {
        fs::create_dir_all(out_dir)?;
        let prefix = out_dir.join("page");

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .with_context(|| {
                format!(
                    "failed to invoke {}; is poppler-utils installed?",
                    self.binary.display()
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pdftoppm failed with status {}: {stderr}", output.status);
        }

        // pdftoppm names pages `page-1.png` or `page-01.png` depending on the
        // page count, so collect whatever it wrote.
        let mut images: Vec<(usize, PathBuf)> = fs::read_dir(out_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|path| page_number(&path).map(|n| (n, path)))
            .collect();
        images.sort_by_key(|(number, _)| *number);

        let pages = images
            .into_iter()
            .map(|(_, path)| {
                let (width, height) = image::image_dimensions(&path).unwrap_or((0, 0));
                log::debug!("rendered {} ({width}x{height} px)", path.display());
                RenderedPage {
                    path,
                    width,
                    height,
                }
            })
            .collect::<Vec<_>>();

        if pages.is_empty() {
            anyhow::bail!("pdftoppm produced no page images in {}", out_dir.display());
        }
        Ok(pages)
    }
}

fn page_number(path: &Path) -> Option<usize> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}
