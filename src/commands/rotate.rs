use super::{output_path, plan_every_page, plan_pages};
use crate::page_range::SelectionMode;
use crate::pdf::{PdfDocument, Rotation};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct RotateSummary {
    pub output_path: PathBuf,
    pub degrees: u16,
    pub pages: usize,
}

impl fmt::Display for RotateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rotated {} page(s) to {}° in {}",
            self.pages,
            self.degrees,
            self.output_path.display()
        )
    }
}

/// Parse a rotation given in degrees on the command line.
pub fn parse_angle(s: &str) -> Result<Rotation, String> {
    let degrees: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid angle: {}", s))?;
    Rotation::from_degrees(degrees)
        .ok_or_else(|| format!("angle must be a multiple of 90, got {}", degrees))
}

/// Set the rotation of the selected pages, or of every page when `pages`
/// is `None`.
pub fn run(
    input: &Path,
    rotation: Rotation,
    pages: Option<&str>,
    output: Option<&Path>,
) -> Result<RotateSummary> {
    let mut doc = PdfDocument::open(input)?;
    let targets = match pages {
        Some(spec) => plan_pages(&doc, spec, SelectionMode::Apply)?.into_indices(),
        None => plan_every_page(&doc, SelectionMode::Apply)?.into_indices(),
    };

    doc.rotate_pages(&targets, rotation)?;

    let prefix = format!("rotated-{}-", rotation.degrees());
    let output_path = output_path(input, &prefix, output);
    PdfDocument::save(&mut doc.doc, &output_path)?;

    Ok(RotateSummary {
        output_path,
        degrees: rotation.degrees(),
        pages: targets.len(),
    })
}
