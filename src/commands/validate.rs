use crate::page_range::plan::plan;
use crate::page_range::{PagePlan, SelectionMode, SelectionRequest, ValidationOutcome};
use crate::pdf::PdfDocument;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Everything known about a page selection, without touching any document.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub spec: String,
    pub page_count: u32,
    pub mode: SelectionMode,
    /// Zero-based.
    pub outcome: ValidationOutcome,
    /// Zero-based; absent when the selection was rejected.
    pub plan: Option<PagePlan>,
    pub error: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.plan.is_some()
    }
}

fn one_based(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.plan, &self.error) {
            (Some(PagePlan::Indices(indices)), _) => {
                write!(f, "Pages: {}", one_based(indices))
            }
            (Some(PagePlan::Runs(runs)), _) => {
                for (i, run) in runs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "Part {}: {}", i + 1, one_based(run))?;
                }
                Ok(())
            }
            (None, error) => {
                write!(f, "{}", error.as_deref().unwrap_or("invalid selection"))?;
                for err in &self.outcome.errors {
                    write!(f, "\n  {}", err)?;
                }
                Ok(())
            }
        }
    }
}

pub fn check(spec: &str, page_count: u32, mode: SelectionMode) -> ValidationReport {
    let outcome = SelectionRequest::new(spec, page_count, mode).validate();
    let (plan, error) = match plan(&outcome, mode) {
        Ok(plan) => (Some(plan), None),
        Err(err) => (None, Some(err.to_string())),
    };
    ValidationReport {
        spec: spec.to_string(),
        page_count,
        mode,
        outcome,
        plan,
        error,
    }
}

/// Check `spec` against a page count taken from `file` or given directly.
pub fn run(
    spec: &str,
    file: Option<&Path>,
    page_count: Option<u32>,
    mode: SelectionMode,
) -> Result<ValidationReport> {
    let page_count = match (file, page_count) {
        (Some(path), _) => PdfDocument::open(path)?.page_count(),
        (None, Some(count)) => count,
        (None, None) => anyhow::bail!("Either a PDF file or a page count is required"),
    };
    Ok(check(spec, page_count, mode))
}
