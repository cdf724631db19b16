use crate::pdf::merge::merge_documents;
use crate::pdf::PdfDocument;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct MergeSummary {
    pub output_path: PathBuf,
    pub inputs: usize,
    pub page_count: usize,
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merged {} files ({} pages) into {}",
            self.inputs,
            self.page_count,
            self.output_path.display()
        )
    }
}

pub fn run<P: AsRef<Path>>(inputs: &[P], output: Option<&Path>) -> Result<MergeSummary> {
    if inputs.len() < 2 {
        anyhow::bail!("Please select at least 2 PDF files to merge");
    }

    let documents = inputs
        .iter()
        .map(PdfDocument::open)
        .collect::<Result<Vec<_>>>()?;

    let mut merged = merge_documents(documents)?;
    let page_count = merged.get_pages().len();

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("merged-document.pdf"));
    PdfDocument::save(&mut merged, &output_path)?;

    Ok(MergeSummary {
        output_path,
        inputs: inputs.len(),
        page_count,
    })
}
