use super::{output_path, plan_pages};
use crate::page_range::SelectionMode;
use crate::pdf::PdfDocument;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct RemoveSummary {
    pub output_path: PathBuf,
    pub removed: usize,
    pub remaining: u32,
}

impl fmt::Display for RemoveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Removed {} page(s), {} left, saved to {}",
            self.removed,
            self.remaining,
            self.output_path.display()
        )
    }
}

/// Delete the pages named by `pages`. Repeats are ignored.
pub fn run(input: &Path, pages: &str, output: Option<&Path>) -> Result<RemoveSummary> {
    let doc = PdfDocument::open(input)?;
    let doomed = plan_pages(&doc, pages, SelectionMode::Remove)?.into_indices();

    let output_path = output_path(input, "removed-pages-", output);
    let mut new_doc = doc.remove_pages(&doomed)?;
    PdfDocument::save(&mut new_doc, &output_path)?;

    Ok(RemoveSummary {
        output_path,
        removed: doomed.len(),
        remaining: doc.page_count() - doomed.len() as u32,
    })
}
