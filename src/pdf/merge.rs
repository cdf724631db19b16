//! Concatenate several documents into one.

use super::tree::rebuild_page_tree;
use super::PdfDocument;
use anyhow::{Context, Result};
use lopdf::{Document, ObjectId};

fn highest_id(doc: &Document) -> u32 {
    doc.objects.keys().map(|(id, _)| *id).max().unwrap_or(0)
}

/// Merge `documents` in order into a single document.
///
/// The first document is the base: its catalog, metadata and outline are
/// kept. Every later document is renumbered past the objects already
/// present, copied in, and its pages appended to the base page tree.
pub fn merge_documents(documents: Vec<PdfDocument>) -> Result<Document> {
    if documents.len() < 2 {
        anyhow::bail!("Please select at least 2 PDF files to merge");
    }

    let mut sources = documents.into_iter();
    let base = sources.next().context("No documents to merge")?;
    let mut merged = base.doc;
    let mut order: Vec<ObjectId> = merged.get_pages().into_values().collect();

    for source in sources {
        let mut doc = source.doc;
        doc.renumber_objects_with(highest_id(&merged) + 1);

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        tracing::debug!(path = %source.path, pages = pages.len(), "appending document");
        order.extend(pages);

        merged.objects.extend(doc.objects);
        merged.max_id = highest_id(&merged);
    }

    rebuild_page_tree(&mut merged, &order)?;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{create_nested_test_pdf, create_test_pdf, page_markers, to_bytes};
    use pretty_assertions::assert_eq;

    fn handle(mut doc: Document, name: &str) -> PdfDocument {
        PdfDocument::load_mem(&to_bytes(&mut doc), name).unwrap()
    }

    #[test]
    fn test_merge_concatenates_in_order() {
        let merged = merge_documents(vec![
            handle(create_test_pdf(2), "a.pdf"),
            handle(create_test_pdf(3), "b.pdf"),
        ])
        .unwrap();
        assert_eq!(
            page_markers(&merged),
            vec!["Page 1", "Page 2", "Page 1", "Page 2", "Page 3"]
        );
    }

    #[test]
    fn test_merge_survives_save() {
        let merged = merge_documents(vec![
            handle(create_test_pdf(1), "a.pdf"),
            handle(create_nested_test_pdf(), "b.pdf"),
            handle(create_test_pdf(2), "c.pdf"),
        ])
        .unwrap();
        let reloaded = handle(merged, "m.pdf");
        assert_eq!(reloaded.page_count(), 7);
        assert_eq!(
            reloaded.info().pages[1].rotation,
            90,
            "inherited rotation survives the merge"
        );
    }

    #[test]
    fn test_merge_needs_two_documents() {
        assert!(merge_documents(vec![handle(create_test_pdf(1), "a.pdf")]).is_err());
        assert!(merge_documents(Vec::new()).is_err());
    }
}
