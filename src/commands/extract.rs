use super::{output_path, plan_pages};
use crate::page_range::SelectionMode;
use crate::pdf::PdfDocument;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ExtractSummary {
    pub output_path: PathBuf,
    pub page_count: usize,
}

impl fmt::Display for ExtractSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Extracted {} page(s) to {}",
            self.page_count,
            self.output_path.display()
        )
    }
}

/// Copy the pages named by `pages` into a new PDF, in the order given.
pub fn run(input: &Path, pages: &str, output: Option<&Path>) -> Result<ExtractSummary> {
    let doc = PdfDocument::open(input)?;
    let page_list = plan_pages(&doc, pages, SelectionMode::Extract)?.into_indices();

    let output_path = output_path(input, "extracted-pages-", output);
    let mut new_doc = doc.select_pages(&page_list)?;
    PdfDocument::save(&mut new_doc, &output_path)?;

    Ok(ExtractSummary {
        output_path,
        page_count: page_list.len(),
    })
}
