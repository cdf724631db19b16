pub mod compress;
pub mod extract;
pub mod images;
pub mod info;
pub mod merge;
pub mod remove;
pub mod rotate;
pub mod split;
pub mod validate;
pub mod watermark;

use crate::page_range::plan::plan;
use crate::page_range::resolve::resolve;
use crate::page_range::token::PageSpecToken;
use crate::page_range::{PagePlan, SelectionMode, SelectionRequest};
use crate::pdf::PdfDocument;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Where an operation writes when the user gave no explicit output:
/// next to the input, named `<prefix><input file name>`.
pub fn output_path(input: &Path, prefix: &str, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document.pdf".to_string());
            input.with_file_name(format!("{}{}", prefix, name))
        }
    }
}

/// Plan a page selection against an open document.
///
/// A rejected selection keeps its [`crate::page_range::PlanError`] as the
/// root cause so callers can list every offending token.
pub fn plan_pages(doc: &PdfDocument, spec: &str, mode: SelectionMode) -> Result<PagePlan> {
    SelectionRequest::new(spec, doc.page_count(), mode)
        .plan()
        .with_context(|| format!("Invalid page selection for {}", doc.path))
}

/// Plan covering every page of `doc`. Split plans get one run per page.
pub fn plan_every_page(doc: &PdfDocument, mode: SelectionMode) -> Result<PagePlan> {
    let count = doc.page_count();
    if count == 0 {
        bail!("{} has no pages", doc.path);
    }
    let tokens: Vec<PageSpecToken> = match mode {
        SelectionMode::SplitBoundary => (1..=count).map(PageSpecToken::single).collect(),
        _ => vec![PageSpecToken::range(1, count)],
    };
    Ok(plan(&resolve(&tokens, count), mode)?)
}
