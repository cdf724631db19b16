use super::output_path;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct CompressSummary {
    pub output_path: PathBuf,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Negative when the output grew.
    pub savings_percent: f64,
}

impl fmt::Display for CompressSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Compressed {} -> {} bytes ({:.1}% smaller), saved to {}",
            self.original_size,
            self.compressed_size,
            self.savings_percent,
            self.output_path.display()
        )
    }
}

fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original as f64 - compressed as f64) / original as f64 * 100.0
}

pub fn run(input: &Path, output: Option<&Path>) -> Result<CompressSummary> {
    let original_size = std::fs::metadata(input)
        .with_context(|| format!("Failed to read {}", input.display()))?
        .len();

    let mut doc = PdfDocument::open(input)?;
    doc.compress();

    let output_path = output_path(input, "compressed-", output);
    PdfDocument::save_compact(&mut doc.doc, &output_path)?;
    let compressed_size = std::fs::metadata(&output_path)
        .with_context(|| format!("Failed to read {}", output_path.display()))?
        .len();

    Ok(CompressSummary {
        output_path,
        original_size,
        compressed_size,
        savings_percent: savings_percent(original_size, compressed_size),
    })
}
