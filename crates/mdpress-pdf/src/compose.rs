//! PDF page composition.
//!
//! The raster is stored once as an image XObject. Every page draws it
//! shifted up by the page's offset and clipped to the printable area, so the
//! pages together show the raster from top to bottom.

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use mdpress_meta::DocumentMetadata;

use crate::layout::{PageLayout, mm_to_pt};

const IMAGE_NAME: &str = "Im0";
const PDF_VERSION: &str = "1.5";

#[allow(clippy::cast_possible_truncation)]
fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn image_object(raster: &RgbImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(raster.width()),
            "Height" => i64::from(raster.height()),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        raster.as_raw().clone(),
    )
}

/// Drawing operations for the page starting `offset_mm` into the image.
fn page_operations(layout: &PageLayout, image_height_mm: f64, offset_mm: f64) -> Vec<Operation> {
    let margin = mm_to_pt(layout.margin_mm);
    let page_height = mm_to_pt(layout.page_height_mm);
    let width = mm_to_pt(layout.printable_width_mm());
    let height = mm_to_pt(image_height_mm);
    // Image bottom edge, measured from the page bottom.
    let y = page_height - margin - height + mm_to_pt(offset_mm);

    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "re",
            vec![
                real(margin),
                real(margin),
                real(width),
                real(mm_to_pt(layout.printable_height_mm())),
            ],
        ),
        Operation::new("W", vec![]),
        Operation::new("n", vec![]),
        Operation::new(
            "cm",
            vec![real(width), real(0.0), real(0.0), real(height), real(margin), real(y)],
        ),
        Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn info_dictionary(metadata: &DocumentMetadata) -> lopdf::Dictionary {
    let mut info = dictionary! {
        "Title" => text_string(&metadata.title),
        "Producer" => Object::string_literal(concat!("mdpress ", env!("CARGO_PKG_VERSION"))),
    };
    if !metadata.author.is_empty() {
        info.set("Author", text_string(&metadata.author));
    }
    info
}

/// PDF composition error.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("PDF encoding error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page count out of range: {0}")]
    PageCount(#[from] std::num::TryFromIntError),
}

/// Build a PDF with one page per offset, each showing a band of `raster`.
///
/// # Errors
///
/// Returns [`ComposeError`] if a content stream cannot be encoded or the
/// document cannot be serialized.
pub fn compose_pages(
    raster: &RgbImage,
    offsets: &[f64],
    layout: &PageLayout,
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, ComposeError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(image_object(raster));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { IMAGE_NAME => image_id },
    });

    let image_height_mm = layout.image_height_mm(raster.width(), raster.height());
    let media_box = vec![
        real(0.0),
        real(0.0),
        real(mm_to_pt(layout.page_width_mm)),
        real(mm_to_pt(layout.page_height_mm)),
    ];

    let mut kids: Vec<Object> = Vec::with_capacity(offsets.len());
    for &offset in offsets {
        let content = Content {
            operations: page_operations(layout, image_height_mm, offset),
        };
        let encoded = content.encode()?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => media_box.clone(),
        });
        kids.push(page_id.into());
    }

    let count = i64::try_from(kids.len())?;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(info_dictionary(metadata));
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}
