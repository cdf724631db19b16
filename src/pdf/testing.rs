//! In-memory PDFs for tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

fn marker_page(doc: &mut Document, parent: ObjectId, label: &str, media_box: bool) -> ObjectId {
    let content = format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", label);
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(parent)),
        ("Contents", Object::Reference(content_id)),
    ]);
    if media_box {
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        );
    }
    doc.add_object(page)
}

fn finish(doc: &mut Document, pages_id: ObjectId, pages: Dictionary) {
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));
}

/// A flat document whose pages draw "Page 1", "Page 2", ...
pub fn create_test_pdf(num_pages: u32) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (1..=num_pages)
        .map(|n| Object::Reference(marker_page(&mut doc, pages_id, &format!("Page {}", n), true)))
        .collect();

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    finish(&mut doc, pages_id, pages);
    doc
}

/// Four pages under two intermediate nodes. The first node supplies
/// `MediaBox`, `Rotate` and `Resources` to its two pages by inheritance.
pub fn create_nested_test_pdf() -> Document {
    let mut doc = Document::with_version("1.7");
    let root_id = doc.new_object_id();
    let left_id = doc.new_object_id();
    let right_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]);

    let left_kids = vec![
        Object::Reference(marker_page(&mut doc, left_id, "Page 1", false)),
        Object::Reference(marker_page(&mut doc, left_id, "Page 2", false)),
    ];
    let right_kids = vec![
        Object::Reference(marker_page(&mut doc, right_id, "Page 3", true)),
        Object::Reference(marker_page(&mut doc, right_id, "Page 4", true)),
    ];

    doc.objects.insert(
        left_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root_id)),
            ("Count", Object::Integer(2)),
            ("Kids", Object::Array(left_kids)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Integer(400),
                ]),
            ),
            ("Rotate", Object::Integer(90)),
            ("Resources", Object::Dictionary(resources)),
        ])),
    );
    doc.objects.insert(
        right_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Parent", Object::Reference(root_id)),
            ("Count", Object::Integer(2)),
            ("Kids", Object::Array(right_kids)),
        ])),
    );

    let root = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(4)),
        (
            "Kids",
            Object::Array(vec![Object::Reference(left_id), Object::Reference(right_id)]),
        ),
    ]);
    finish(&mut doc, root_id, root);
    doc
}

/// A solid-colour `width` x `height` image encoded as `format`.
pub fn encode_image(format: image::ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 40]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

pub fn to_bytes(doc: &mut Document) -> Vec<u8> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The "Page N" label drawn by each page, in page order.
pub fn page_markers(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let ids: Vec<ObjectId> = match page.get(b"Contents").unwrap() {
                Object::Reference(id) => vec![*id],
                Object::Array(items) => items.iter().map(|o| o.as_reference().unwrap()).collect(),
                other => panic!("unexpected Contents {:?}", other),
            };
            ids.into_iter()
                .filter_map(|id| {
                    let stream = doc.get_object(id).unwrap().as_stream().unwrap();
                    let text = String::from_utf8_lossy(&stream.content).into_owned();
                    let start = text.find("(Page ")? + 1;
                    let end = start + text[start..].find(')')?;
                    Some(text[start..end].to_string())
                })
                .next()
                .unwrap_or_default()
        })
        .collect()
}
