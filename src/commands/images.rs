use crate::pdf::images::images_to_document;
use crate::pdf::{ImageSource, PdfDocument};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Serialize)]
pub struct ImagesSummary {
    pub output_path: PathBuf,
    pub page_count: usize,
}

impl fmt::Display for ImagesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} image(s) into {}",
            self.page_count,
            self.output_path.display()
        )
    }
}

fn read_image(path: &Path) -> Result<ImageSource> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
    if !supported {
        anyhow::bail!(
            "Unsupported image {}: expected a .jpg, .jpeg or .png file",
            path.display()
        );
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ImageSource {
        name: path.display().to_string(),
        bytes,
    })
}

/// Turn JPG and PNG files into one PDF, one page per image in the order given.
pub fn run<P: AsRef<Path>>(inputs: &[P], output: Option<&Path>) -> Result<ImagesSummary> {
    let images = inputs
        .iter()
        .map(|path| read_image(path.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut doc = images_to_document(images)?;
    let page_count = doc.get_pages().len();

    let output_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("images-to-pdf.pdf"));
    PdfDocument::save(&mut doc, &output_path)?;

    Ok(ImagesSummary {
        output_path,
        page_count,
    })
}
