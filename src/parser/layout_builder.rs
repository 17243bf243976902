use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::geometry::BBox;
use crate::parser::WordSource;
use crate::text::ScratchPdf;

#[derive(Debug, Clone, PartialEq)]
pub struct WordBox {
    pub text: String,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageWords {
    pub page_idx: usize,
    pub width: f32,
    pub height: f32,
    pub words: Vec<WordBox>,
}

impl PageWords {
    /// Words whose centre falls in the top-left quarter of the page.
    pub fn top_left_quadrant(&self) -> Vec<&WordBox> {
        let region = BBox::top_left_quadrant(self.width, self.height);
        self.words
            .iter()
            .filter(|word| {
                let (cx, cy) = word.bbox.center();
                region.contains_point(cx, cy)
            })
            .collect()
    }
}

fn round1(v: f32) -> f32 {
    (v * 10.0).round() / 10.0
}

/// Top-to-bottom, then left-to-right.
pub fn reading_order(words: &mut [&WordBox]) {
    words.sort_by(|a, b| {
        round1(a.bbox.y0)
            .total_cmp(&round1(b.bbox.y0))
            .then(round1(a.bbox.x0).total_cmp(&round1(b.bbox.x0)))
    });
}

/// Non-empty word texts from the top-left quadrant of every page, in reading
/// order, page after page.
pub fn quadrant_tokens(pages: &[PageWords]) -> Vec<String> {
    let mut tokens = Vec::new();
    for page in pages {
        let mut words = page.top_left_quadrant();
        reading_order(&mut words);
        tokens.extend(
            words
                .into_iter()
                .map(|word| word.text.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        );
    }
    tokens
}

static PAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<page\s+width="([\d.]+)"\s+height="([\d.]+)""#)
        .expect("page pattern is a valid literal")
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<word\s+xMin="([\d.]+)"\s+yMin="([\d.]+)"\s+xMax="([\d.]+)"\s+yMax="([\d.]+)">([^<]*)</word>"#,
    )
    .expect("word pattern is a valid literal")
});

fn unescape_html(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn parse_f32(raw: &str) -> f32 {
    raw.parse().unwrap_or(0.0)
}

/// Parses the XHTML written by `pdftotext -bbox`.
pub fn parse_bbox_html(html: &str) -> Vec<PageWords> {
    let mut pages: Vec<PageWords> = Vec::new();

    for line in html.lines() {
        if let Some(caps) = PAGE_RE.captures(line) {
            pages.push(PageWords {
                page_idx: pages.len(),
                width: parse_f32(&caps[1]),
                height: parse_f32(&caps[2]),
                words: Vec::new(),
            });
            continue;
        }
        if let Some(caps) = WORD_RE.captures(line) {
            let Some(page) = pages.last_mut() else {
                continue;
            };
            page.words.push(WordBox {
                text: unescape_html(&caps[5]),
                bbox: BBox::new(
                    parse_f32(&caps[1]),
                    parse_f32(&caps[2]),
                    parse_f32(&caps[3]),
                    parse_f32(&caps[4]),
                ),
            });
        }
    }

    pages
}

#[derive(Debug, Clone)]
pub struct PopplerWordSource {
    binary: PathBuf,
}

impl PopplerWordSource {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

impl Default for PopplerWordSource {
    fn default() -> Self {
        Self::new(PathBuf::from("pdftotext"))
    }
}

impl WordSource for PopplerWordSource {
    fn page_words(&self, pdf: &ScratchPdf<'_>) -> Result<Vec<PageWords>> {
        let output = Command::new(&self.binary)
            .arg("-bbox")
            .arg("-enc")
            .arg("UTF-8")
            .arg(pdf.path())
            .arg("-")
            .output()
            .with_context(|| format!("failed to invoke {} -bbox", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("pdftotext -bbox failed with status {}: {stderr}", output.status);
        }

        Ok(parse_bbox_html(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<!DOCTYPE html>
<html><body>
<doc>
  <page width="612.000000" height="792.000000">
    <word xMin="200.000000" yMin="50.000000" xMax="240.000000" yMax="60.000000">5015.97</word>
    <word xMin="20.000000" yMin="50.040000" xMax="60.000000" yMax="60.000000">Wages</word>
    <word xMin="20.000000" yMin="20.000000" xMax="60.000000" yMax="30.000000">A&amp;B</word>
    <word xMin="400.000000" yMin="50.000000" xMax="440.000000" yMax="60.000000">999.99</word>
    <word xMin="20.000000" yMin="500.000000" xMax="60.000000" yMax="510.000000">111.11</word>
  </page>
</doc>
</body></html>"#;

    #[test]
    fn parses_pages_and_words() {
        let pages = parse_bbox_html(SAMPLE);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].width, 612.0);
        assert_eq!(pages[0].words.len(), 5);
        assert_eq!(pages[0].words[2].text, "A&B");
    }

    #[test]
    fn quadrant_tokens_are_clipped_and_ordered() {
        let pages = parse_bbox_html(SAMPLE);
        assert_eq!(quadrant_tokens(&pages), vec!["A&B", "Wages", "5015.97"]);
    }

    #[test]
    fn words_before_any_page_are_ignored() {
        let html = r#"<word xMin="1" yMin="1" xMax="2" yMax="2">x</word>"#;
        assert!(parse_bbox_html(html).is_empty());
    }
}
