//! Build a document with one page per image.

use anyhow::{Context, Result};
use lopdf::{xobject, Dictionary, Document, Object, ObjectId, Stream};

const IMAGE_RESOURCE: &str = "Im0";

/// An image file's bytes and the name used in error messages.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

fn dimension(image: &Stream, key: &[u8]) -> Option<i64> {
    image
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .filter(|&value| value > 0)
}

/// Add a page exactly the size of `image`, one point per pixel, that draws it.
fn add_image_page(doc: &mut Document, parent: ObjectId, image: Stream) -> Result<ObjectId> {
    let (width, height) = match (dimension(&image, b"Width"), dimension(&image, b"Height")) {
        (Some(width), Some(height)) => (width, height),
        _ => anyhow::bail!("Image has no usable dimensions"),
    };
    let image_id = doc.add_object(image);

    let content = format!(
        "q\n{} 0 0 {} 0 0 cm\n/{} Do\nQ\n",
        width, height, IMAGE_RESOURCE
    );
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let xobjects = Dictionary::from_iter(vec![(IMAGE_RESOURCE, Object::Reference(image_id))]);
    let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);
    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(parent)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    Ok(doc.add_object(page))
}

/// Embed `images` in order, one page each.
///
/// JPEG data is stored as-is behind `DCTDecode`. Other formats are decoded
/// to raw samples, dropping any alpha channel, and Flate-compressed.
pub fn images_to_document(images: Vec<ImageSource>) -> Result<Document> {
    if images.is_empty() {
        anyhow::bail!("Please select at least one image");
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(images.len());
    for source in images {
        let image = xobject::image_from(source.bytes)
            .with_context(|| format!("Failed to read image: {}", source.name))?;
        let page_id = add_image_page(&mut doc, pages_id, image)
            .with_context(|| format!("Failed to embed image: {}", source.name))?;
        tracing::debug!(image = %source.name, "embedded image");
        kids.push(Object::Reference(page_id));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    Ok(doc)
}
