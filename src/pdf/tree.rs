use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};
use std::collections::HashSet;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

// Guards against `/Parent` cycles in broken files.
const MAX_TREE_DEPTH: usize = 64;

pub fn pages_root_id(doc: &Document) -> Result<ObjectId> {
    doc.catalog()
        .context("Document has no catalog")?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .context("Catalog has no page tree")
}

/// Look up `key` on a page, walking up `/Parent` links if the page lacks it.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Read a number that may be stored as an integer or a real, possibly
/// behind a reference.
pub fn number(doc: &Document, obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        Object::Reference(id) => number(doc, doc.get_object(*id).ok()?),
        _ => None,
    }
}

/// The `[llx, lly, urx, ury]` media box of a page, inherited if necessary.
pub fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let obj = inherited_attribute(doc, page_id, b"MediaBox")?;
    let array = match &obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        other => other.as_array().ok()?,
    };
    if array.len() != 4 {
        return None;
    }
    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(array) {
        *slot = number(doc, value)?;
    }
    Some(rect)
}

/// Replace the page tree with a single flat node listing `order`.
///
/// Pages appear exactly as listed. A page listed more than once is copied
/// into a fresh object for every repeat. Inherited attributes are copied
/// onto each page first so flattening does not change how pages render, and
/// anything no longer reachable is pruned afterwards.
pub fn rebuild_page_tree(doc: &mut Document, order: &[ObjectId]) -> Result<()> {
    let root_id = pages_root_id(doc)?;
    let mut placed = HashSet::new();
    let mut kids = Vec::with_capacity(order.len());

    for &page_id in order {
        let mut page = doc
            .get_dictionary(page_id)
            .with_context(|| format!("Page object {:?} is missing", page_id))?
            .clone();

        for key in INHERITABLE {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    page.set(key.to_vec(), value);
                }
            }
        }
        page.set("Parent", Object::Reference(root_id));

        let id = if placed.insert(page_id) {
            doc.objects.insert(page_id, Object::Dictionary(page));
            page_id
        } else {
            doc.add_object(Object::Dictionary(page))
        };
        kids.push(Object::Reference(id));
    }

    let root = doc
        .get_dictionary_mut(root_id)
        .context("Page tree root is not a dictionary")?;
    root.set("Count", Object::Integer(kids.len() as i64));
    root.set("Kids", Object::Array(kids));

    let pruned = doc.prune_objects();
    tracing::trace!(pages = order.len(), pruned = pruned.len(), "rebuilt page tree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::{create_nested_test_pdf, create_test_pdf, page_markers};

    #[test]
    fn test_inherits_from_intermediate_node() {
        let doc = create_nested_test_pdf();
        let pages: Vec<_> = doc.get_pages().into_values().collect();
        assert!(matches!(
            inherited_attribute(&doc, pages[0], b"Rotate"),
            Some(Object::Integer(90))
        ));
        assert_eq!(media_box(&doc, pages[0]), Some([0.0, 0.0, 300.0, 400.0]));
        assert!(inherited_attribute(&doc, pages[0], b"CropBox").is_none());
        // Pages under the second node carry their own box.
        assert_eq!(media_box(&doc, pages[2]), Some([0.0, 0.0, 612.0, 792.0]));
        assert!(inherited_attribute(&doc, pages[2], b"Rotate").is_none());
    }

    #[test]
    fn test_rebuild_reorders_and_duplicates() {
        let mut doc = create_test_pdf(3);
        let pages: Vec<_> = doc.get_pages().into_values().collect();
        rebuild_page_tree(&mut doc, &[pages[2], pages[0], pages[2]]).unwrap();
        assert_eq!(page_markers(&doc), vec!["Page 3", "Page 1", "Page 3"]);
        // Page 2 is no longer reachable.
        assert!(doc.get_object(pages[1]).is_err());
    }

    #[test]
    fn test_rebuild_flattens_nested_tree() {
        let mut doc = create_nested_test_pdf();
        let pages: Vec<_> = doc.get_pages().into_values().collect();
        rebuild_page_tree(&mut doc, &pages).unwrap();

        let root = pages_root_id(&doc).unwrap();
        let flattened: Vec<_> = doc.get_pages().into_values().collect();
        assert_eq!(page_markers(&doc), vec!["Page 1", "Page 2", "Page 3", "Page 4"]);
        for &page_id in &flattened[..2] {
            let page = doc.get_dictionary(page_id).unwrap();
            assert_eq!(page.get(b"Rotate").and_then(Object::as_i64).unwrap(), 90);
            assert!(page.has(b"Resources"));
        }
        for page_id in flattened {
            let page = doc.get_dictionary(page_id).unwrap();
            assert_eq!(page.get(b"Parent").and_then(Object::as_reference).unwrap(), root);
            assert!(page.has(b"MediaBox"));
        }
    }
}
