use super::{plan_every_page, plan_pages};
use crate::page_range::SelectionMode;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct SplitPart {
    pub output_path: PathBuf,
    pub first_page: u32,
    pub last_page: u32,
    pub page_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SplitSummary {
    pub output_dir: PathBuf,
    pub parts: Vec<SplitPart>,
}

impl fmt::Display for SplitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            writeln!(
                f,
                "pages {}-{} -> {}",
                part.first_page,
                part.last_page,
                part.output_path.display()
            )?;
        }
        write!(
            f,
            "Split into {} file(s) in {}",
            self.parts.len(),
            self.output_dir.display()
        )
    }
}

/// Write one PDF per range in `ranges`, or one per page when no ranges are
/// given. Overlapping ranges give overlapping files.
pub fn run(input: &Path, ranges: Option<&str>, output_dir: Option<&Path>) -> Result<SplitSummary> {
    let doc = PdfDocument::open(input)?;

    let plan = match ranges {
        Some(ranges) => plan_pages(&doc, ranges, SelectionMode::SplitBoundary)?,
        None => plan_every_page(&doc, SelectionMode::SplitBoundary)?,
    };
    let burst = ranges.is_none();
    let runs = plan.into_runs();

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    if !output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;
    }

    // Get the base name of the input file
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page");

    let mut parts = Vec::with_capacity(runs.len());
    for (i, run) in runs.iter().enumerate() {
        let (Some(&first), Some(&last)) = (run.first(), run.last()) else {
            continue;
        };
        let (first_page, last_page) = (first as u32 + 1, last as u32 + 1);
        let file_name = if burst {
            format!("{}_{:04}.pdf", stem, first_page)
        } else {
            format!("split-{}_pages-{}-{}.pdf", i + 1, first_page, last_page)
        };
        let output_path = output_dir.join(file_name);

        let mut new_doc = doc.select_pages(run)?;
        PdfDocument::save(&mut new_doc, &output_path)?;

        parts.push(SplitPart {
            output_path,
            first_page,
            last_page,
            page_count: run.len(),
        });
    }

    Ok(SplitSummary { output_dir, parts })
}
