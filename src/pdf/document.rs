use super::tree::{inherited_attribute, media_box, number, rebuild_page_tree};
use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Absolute page orientation, as stored in a page's `/Rotate` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Right, // 90° clockwise
    Down,  // 180°
    Left,  // 270° clockwise
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Right => 90,
            Rotation::Down => 180,
            Rotation::Left => 270,
        }
    }

    /// Normalise any multiple of 90 (negative ones included).
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Right),
            180 => Some(Rotation::Down),
            270 => Some(Rotation::Left),
            _ => None,
        }
    }
}

/// A loaded PDF and the only handle operations get to it.
pub struct PdfDocument {
    pub doc: Document,
    pub path: String,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let doc =
            Document::load(&path).with_context(|| format!("Failed to open PDF: {}", path_str))?;
        tracing::debug!(path = %path_str, pages = doc.get_pages().len(), "opened PDF");
        Ok(PdfDocument {
            doc,
            path: path_str,
        })
    }

    #[cfg(test)]
    pub fn load_mem(bytes: &[u8], name: &str) -> Result<Self> {
        let doc =
            Document::load_mem(bytes).with_context(|| format!("Failed to parse PDF: {}", name))?;
        Ok(PdfDocument {
            doc,
            path: name.to_string(),
        })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object ids in page order, so `page_ids()[i]` is page index `i`.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    fn ids_for(&self, indices: &[usize]) -> Result<Vec<ObjectId>> {
        let all_pages = self.page_ids();
        indices
            .iter()
            .map(|&index| {
                all_pages.get(index).copied().with_context(|| {
                    format!(
                        "Page index {} is out of range (document has {} pages)",
                        index,
                        all_pages.len()
                    )
                })
            })
            .collect()
    }

    /// Get metadata from the document info dictionary plus a summary of
    /// every page.
    pub fn info(&self) -> PdfInfo {
        let mut info = PdfInfo::default();

        let dict = match self.doc.trailer.get(b"Info") {
            Ok(Object::Reference(id)) => self.doc.get_dictionary(*id).ok(),
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        if let Some(dict) = dict {
            info.title = get_string_from_dict(dict, b"Title");
            info.author = get_string_from_dict(dict, b"Author");
            info.subject = get_string_from_dict(dict, b"Subject");
            info.keywords = get_string_from_dict(dict, b"Keywords");
            info.creator = get_string_from_dict(dict, b"Creator");
            info.producer = get_string_from_dict(dict, b"Producer");
            info.creation_date = get_string_from_dict(dict, b"CreationDate");
            info.mod_date = get_string_from_dict(dict, b"ModDate");
        }

        info.pages = self
            .page_ids()
            .into_iter()
            .enumerate()
            .map(|(index, page_id)| {
                let [llx, lly, urx, ury] = media_box(&self.doc, page_id).unwrap_or_default();
                PageSummary {
                    number: index as u32 + 1,
                    width: (urx - llx).abs(),
                    height: (ury - lly).abs(),
                    rotation: self.rotation_of(page_id),
                }
            })
            .collect();
        info.page_count = info.pages.len() as u32;
        info
    }

    fn rotation_of(&self, page_id: ObjectId) -> u16 {
        inherited_attribute(&self.doc, page_id, b"Rotate")
            .and_then(|obj| number(&self.doc, &obj))
            .and_then(|degrees| Rotation::from_degrees(degrees as i64))
            .unwrap_or(Rotation::None)
            .degrees()
    }

    /// Build a new document holding exactly `indices`, in that order.
    ///
    /// Repeated indices produce repeated pages.
    pub fn select_pages(&self, indices: &[usize]) -> Result<Document> {
        if indices.is_empty() {
            anyhow::bail!("No pages selected");
        }
        let order = self.ids_for(indices)?;
        let mut new_doc = self.doc.clone();
        rebuild_page_tree(&mut new_doc, &order)?;
        Ok(new_doc)
    }

    /// Build a new document without `indices`.
    ///
    /// `indices` must be unique and in descending order: every deletion
    /// renumbers the pages after it, so the highest page has to go first.
    pub fn remove_pages(&self, indices: &[usize]) -> Result<Document> {
        debug_assert!(
            indices.windows(2).all(|w| w[0] > w[1]),
            "removal order must be strictly descending"
        );
        let total = self.page_count() as usize;
        if let Some(&index) = indices.iter().find(|&&index| index >= total) {
            anyhow::bail!(
                "Page index {} is out of range (document has {} pages)",
                index,
                total
            );
        }
        if indices.len() >= total {
            anyhow::bail!("Cannot remove all {} page(s) of the document", total);
        }

        let mut new_doc = self.doc.clone();
        for &index in indices {
            new_doc.delete_pages(&[index as u32 + 1]);
        }
        new_doc.prune_objects();
        Ok(new_doc)
    }

    /// Set the absolute rotation of the pages at `indices`.
    pub fn rotate_pages(&mut self, indices: &[usize], rotation: Rotation) -> Result<()> {
        for page_id in self.ids_for(indices)? {
            self.doc
                .get_dictionary_mut(page_id)
                .with_context(|| format!("Page object {:?} is not a dictionary", page_id))?
                .set("Rotate", Object::Integer(rotation.degrees() as i64));
        }
        Ok(())
    }

    /// Stamp `text` onto the pages at `indices`.
    pub fn watermark_pages(
        &mut self,
        indices: &[usize],
        text: &str,
        style: &super::watermark::WatermarkStyle,
    ) -> Result<()> {
        let page_ids = self.ids_for(indices)?;
        super::watermark::apply_watermark(&mut self.doc, &page_ids, text, style)
    }

    /// Drop unreachable objects and empty streams, then Flate-compress the rest.
    pub fn compress(&mut self) {
        let pruned = self.doc.prune_objects();
        let empty = self.doc.delete_zero_length_streams();
        self.doc.compress();
        tracing::debug!(
            pruned = pruned.len(),
            empty_streams = empty.len(),
            "compressed document"
        );
    }

    /// Save to a file
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        doc.save(&path)
            .with_context(|| format!("Failed to save PDF: {}", path.as_ref().display()))?;
        tracing::info!(path = %path.as_ref().display(), pages = doc.get_pages().len(), "wrote PDF");
        Ok(())
    }

    /// Save packing non-stream objects into object streams with a
    /// cross-reference stream. Bumps the file to PDF 1.5 if needed.
    pub fn save_compact<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        doc.save_modern(&mut writer)
            .with_context(|| format!("Failed to save PDF: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to save PDF: {}", path.display()))?;
        tracing::info!(path = %path.display(), pages = doc.get_pages().len(), "wrote compact PDF");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct PdfInfo {
    pub page_count: u32,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub mod_date: Option<String>,
    pub pages: Vec<PageSummary>,
}

/// Size in points and effective rotation of one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSummary {
    pub number: u32,
    pub width: f32,
    pub height: f32,
    pub rotation: u16,
}

fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_pdf_string(bytes),
        _ => None,
    }
}

fn decode_pdf_string(bytes: &[u8]) -> Option<String> {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).ok()
        }
        // PDFDocEncoding agrees with Latin-1 for printable text.
        _ => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}
