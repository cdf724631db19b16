use crate::pdf::{PdfDocument, PdfInfo};
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(path: P) -> Result<PdfInfo> {
    Ok(PdfDocument::open(&path)?.info())
}

/// Human-readable rendering of [`PdfInfo`].
pub fn render(path: &Path, info: &PdfInfo) -> String {
    let mut out = format!("File: {}\nPages: {}\n", path.display(), info.page_count);

    let fields = [
        ("Title", &info.title),
        ("Author", &info.author),
        ("Subject", &info.subject),
        ("Keywords", &info.keywords),
        ("Creator", &info.creator),
        ("Producer", &info.producer),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            out.push_str(&format!("{}: {}\n", label, value));
        }
    }
    if let Some(creation_date) = &info.creation_date {
        out.push_str(&format!("Created: {}\n", format_pdf_date(creation_date)));
    }
    if let Some(mod_date) = &info.mod_date {
        out.push_str(&format!("Modified: {}\n", format_pdf_date(mod_date)));
    }

    for page in &info.pages {
        out.push_str(&format!(
            "  p{}: {:.0} x {:.0} pt",
            page.number, page.width, page.height
        ));
        if page.rotation != 0 {
            out.push_str(&format!(", rotated {}°", page.rotation));
        }
        out.push('\n');
    }
    out
}

fn format_pdf_date(date: &str) -> String {
    // D:YYYYMMDDHHmmSS followed by an optional zone
    let Some(d) = date.strip_prefix("D:") else {
        return date.to_string();
    };
    if d.len() < 8 || !d.is_char_boundary(8) {
        return date.to_string();
    }
    let (year, month, day) = (&d[0..4], &d[4..6], &d[6..8]);
    let time = if d.len() >= 14 && d.is_char_boundary(14) {
        format!(" {}:{}:{}", &d[8..10], &d[10..12], &d[12..14])
    } else {
        String::new()
    };
    format!("{}-{}-{}{}", year, month, day, time)
}
