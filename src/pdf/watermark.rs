use super::tree::{inherited_attribute, media_box};
use anyhow::{Context, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

const FONT_RESOURCE: &str = "PdfsuiteWatermarkFont";
const STATE_RESOURCE: &str = "PdfsuiteWatermarkState";

// US Letter, used when a page has no readable MediaBox.
const FALLBACK_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Helvetica-Bold advance widths (1/1000 em) for bytes 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 278, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    278, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];
const DEFAULT_WIDTH: u16 = 556;

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub font_size: f32,
    /// Fill colour, 0 (black) to 1 (white).
    pub gray: f32,
    /// Fill opacity, 0 to 1.
    pub opacity: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        WatermarkStyle {
            font_size: 60.0,
            gray: 0.7,
            opacity: 0.3,
        }
    }
}

/// Encode for WinAnsiEncoding. Characters it cannot represent become '?'.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}

fn text_width(encoded: &[u8], font_size: f32) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&b| {
            let width = match b {
                32..=126 => HELVETICA_BOLD_WIDTHS[(b - 32) as usize],
                _ => DEFAULT_WIDTH,
            };
            width as u32
        })
        .sum();
    units as f32 * font_size / 1000.0
}

fn escape_literal(encoded: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded.len() + 2);
    for &b in encoded {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out
}

/// Draw `text` centred on each page in `page_ids`.
///
/// The page's own content is wrapped in `q`/`Q` first so whatever graphics
/// state it leaves behind cannot leak into the watermark.
pub fn apply_watermark(
    doc: &mut Document,
    page_ids: &[ObjectId],
    text: &str,
    style: &WatermarkStyle,
) -> Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Watermark text is empty");
    }
    if !(0.0..=1.0).contains(&style.opacity) || !(0.0..=1.0).contains(&style.gray) {
        anyhow::bail!("Watermark opacity and gray level must be between 0 and 1");
    }
    if !style.font_size.is_finite() || style.font_size <= 0.0 {
        anyhow::bail!("Watermark font size must be a positive number, got {}", style.font_size);
    }

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica-Bold".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let state_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"ExtGState".to_vec())),
        ("ca", Object::Real(style.opacity.into())),
        ("CA", Object::Real(style.opacity.into())),
    ]));

    let encoded = encode_text(text);
    let width = text_width(&encoded, style.font_size);
    let escaped = escape_literal(&encoded);

    for &page_id in page_ids {
        let [llx, lly, urx, ury] = media_box(doc, page_id).unwrap_or(FALLBACK_MEDIA_BOX);
        let x = llx + (urx - llx) / 2.0 - width / 2.0;
        let y = lly + (ury - lly) / 2.0;

        let mut overlay = format!(
            "Q\nq\n/{} gs\nBT\n/{} {:.2} Tf\n{:.3} {:.3} {:.3} rg\n{:.2} {:.2} Td\n(",
            STATE_RESOURCE, FONT_RESOURCE, style.font_size, style.gray, style.gray, style.gray, x, y
        )
        .into_bytes();
        overlay.extend_from_slice(&escaped);
        overlay.extend_from_slice(b") Tj\nET\nQ\n");

        add_resource(doc, page_id, "Font", FONT_RESOURCE, font_id)?;
        add_resource(doc, page_id, "ExtGState", STATE_RESOURCE, state_id)?;
        wrap_contents(doc, page_id, overlay)?;
    }

    tracing::debug!(pages = page_ids.len(), text, "applied watermark");
    Ok(())
}

/// Resolve `obj` to a dictionary the caller owns, following one reference.
fn owned_dictionary(doc: &Document, obj: &Object, what: &str) -> Result<Dictionary> {
    match obj {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => Ok(doc
            .get_dictionary(*id)
            .with_context(|| format!("/{} {:?} is not a dictionary", what, id))?
            .clone()),
        _ => anyhow::bail!("/{} is neither a dictionary nor a reference", what),
    }
}

/// Add `name` under `/Resources/<category>` for this page only.
///
/// Resources are often shared between pages through a reference, so the
/// page gets its own copy of the resource and category dictionaries before
/// anything is added. Entries inside them still point at the shared objects.
fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    target: ObjectId,
) -> Result<()> {
    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(obj) => owned_dictionary(doc, &obj, "Resources")?,
        None => Dictionary::new(),
    };
    let mut entries = match resources.get(category.as_bytes()) {
        Ok(obj) => owned_dictionary(doc, obj, category)?,
        Err(_) => Dictionary::new(),
    };
    entries.set(name, Object::Reference(target));
    resources.set(category, Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)
        .with_context(|| format!("Page object {:?} is not a dictionary", page_id))?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

fn wrap_contents(doc: &mut Document, page_id: ObjectId, overlay: Vec<u8>) -> Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
