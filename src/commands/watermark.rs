use super::{output_path, plan_every_page, plan_pages};
use crate::page_range::SelectionMode;
use crate::pdf::{PdfDocument, WatermarkStyle};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct WatermarkSummary {
    pub output_path: PathBuf,
    pub pages: usize,
}

impl fmt::Display for WatermarkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Watermarked {} page(s) into {}",
            self.pages,
            self.output_path.display()
        )
    }
}

/// Stamp `text` on the selected pages, or on every page when `pages` is
/// `None`.
pub fn run(
    input: &Path,
    text: &str,
    pages: Option<&str>,
    style: &WatermarkStyle,
    output: Option<&Path>,
) -> Result<WatermarkSummary> {
    let mut doc = PdfDocument::open(input)?;
    let targets = match pages {
        Some(spec) => plan_pages(&doc, spec, SelectionMode::Apply)?.into_indices(),
        None => plan_every_page(&doc, SelectionMode::Apply)?.into_indices(),
    };

    doc.watermark_pages(&targets, text, style)?;

    let output_path = output_path(input, "watermarked-", output);
    PdfDocument::save(&mut doc.doc, &output_path)?;

    Ok(WatermarkSummary {
        output_path,
        pages: targets.len(),
    })
}
