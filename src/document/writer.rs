//! PDF serialization of composed pages.
//!
//! Every page shares one set of Type1 Helvetica fonts. Attachment pages carry
//! a single image XObject named `Im0`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::canvas::{Color, DrawOp, Font, PageSpec, Rect, PAGE_HEIGHT, PAGE_WIDTH};
use super::codec::EncodedImage;
use super::BuildError;

const PDF_VERSION: &str = "1.5";
const IMAGE_RESOURCE: &str = "Im0";

/// A page ready for emission.
pub struct PdfPage<'a> {
    pub spec: &'a PageSpec,
    pub image: Option<&'a EncodedImage>,
}

/// Emit `pages` in order into a new PDF and return its bytes.
pub fn write_pdf(pages: &[PdfPage<'_>], title: &str) -> Result<Vec<u8>, BuildError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    let fonts_id = doc.add_object(fonts);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = add_page(&mut doc, pages_id, fonts_id, page)?;
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_text(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("hostel-admission-server ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| BuildError::Serialize(e.to_string()))?;
    Ok(buffer)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    fonts_id: ObjectId,
    page: &PdfPage<'_>,
) -> Result<ObjectId, BuildError> {
    let mut resources = dictionary! {
        "Font" => fonts_id,
    };
    if let Some(image) = page.image {
        let image_id = add_image(doc, image);
        resources.set("XObject", dictionary! { IMAGE_RESOURCE => image_id });
    }

    let content = Content {
        operations: page_operations(page.spec),
    };
    let encoded = content.encode().map_err(BuildError::Content)?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
    }))
}

fn add_image(doc: &mut Document, image: &EncodedImage) -> ObjectId {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => image.filter.pdf_name(),
    };

    if let Some(alpha) = &image.alpha {
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            alpha.clone(),
        ));
        dict.set("SMask", mask_id);
    }

    doc.add_object(Stream::new(dict, image.data.clone()))
}

fn page_operations(spec: &PageSpec) -> Vec<Operation> {
    let mut ops = Vec::new();

    for op in spec.ops() {
        match op {
            DrawOp::FillRect {
                rect,
                fill,
                outline,
                line_width,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("rg", *fill));
                let paint = match outline {
                    Some(stroke) => {
                        ops.push(color_op("RG", *stroke));
                        ops.push(Operation::new("w", vec![Object::Real(*line_width)]));
                        "B"
                    }
                    None => "f",
                };
                ops.push(rect_op(rect));
                ops.push(Operation::new(paint, vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::StrokeRect { rect, color, line_width } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("RG", *color));
                ops.push(Operation::new("w", vec![Object::Real(*line_width)]));
                ops.push(rect_op(rect));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Line {
                from,
                to,
                color,
                line_width,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("RG", *color));
                ops.push(Operation::new("w", vec![Object::Real(*line_width)]));
                ops.push(Operation::new("m", vec![Object::Real(from.0), Object::Real(from.1)]));
                ops.push(Operation::new("l", vec![Object::Real(to.0), Object::Real(to.1)]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(color_op("rg", *color));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.resource_name().as_bytes().to_vec()), Object::Real(*size)],
                ));
                ops.push(Operation::new("Td", vec![Object::Real(*x), Object::Real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Image { rect } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(rect.width),
                        0.into(),
                        0.into(),
                        Object::Real(rect.height),
                        Object::Real(rect.x),
                        Object::Real(rect.y),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }

    ops
}

fn color_op(operator: &str, color: Color) -> Operation {
    Operation::new(operator, vec![Object::Real(color.r), Object::Real(color.g), Object::Real(color.b)])
}

fn rect_op(rect: &Rect) -> Operation {
    Operation::new(
        "re",
        vec![
            Object::Real(rect.x),
            Object::Real(rect.y),
            Object::Real(rect.width),
            Object::Real(rect.height),
        ],
    )
}

/// Encode text for a WinAnsiEncoding font. Characters outside the code page
/// become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{20AC}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{A0}'..='\u{FF}' => ch as u32 as u8,
            _ => b'?',
        })
        .collect()
}
