//! Attachment pages: one full page per photo, ID proof or signature.

use chrono::NaiveDateTime;

use super::canvas::{Color, Font, PageSpec, Rect, PAGE_HEIGHT, PAGE_WIDTH};
use super::codec::{decode_data_uri, prepare_attachment, EncodedImage};
use super::layout::RenderContext;
use super::{AttachmentKind, PageError};
use crate::form::models::FormRecord;

const PAGE_HEADER_FILL: Color = Color::rgb(0.2, 0.3, 0.6);
const ID_HEADER_FILL: Color = Color::rgb(0.1, 0.2, 0.5);
const ID_FRAME_WIDTH: f32 = 3.0;
const ID_DISCLAIMER_Y: f32 = 30.0;
/// Lowest info baseline that keeps the 80pt info panel 15pt above the disclaimer.
const ID_INFO_MIN_Y: f32 = ID_DISCLAIMER_Y + 15.0 + 60.0;

/// A composed attachment page and the image it blits.
#[derive(Debug)]
pub struct ImagePage {
    pub kind: AttachmentKind,
    pub spec: PageSpec,
    pub image: EncodedImage,
    pub resampled: bool,
}

/// Decode, fit and encode one attachment and lay out its page.
///
/// `index` is 0-based among attachments of the same kind and `total` is how
/// many of that kind were submitted.
pub fn render_image_page(
    kind: AttachmentKind,
    data_uri: &str,
    index: usize,
    total: usize,
    form: &FormRecord,
    ctx: &RenderContext<'_>,
) -> Result<ImagePage, PageError> {
    let decoded = decode_data_uri(data_uri)?;
    let prepared = prepare_attachment(kind, decoded)?;
    let (width, height) = prepared.size();
    let (width, height) = (width as f32, height as f32);

    let student_name = FormRecord::text_or_na(&form.full_name);
    let mut spec = PageSpec::new();

    match kind {
        AttachmentKind::Photo => {
            draw_simple_header(&mut spec, "STUDENT PHOTO");
            let rect = Rect::new(
                (PAGE_WIDTH - width) / 2.0,
                (PAGE_HEIGHT - height) / 2.0 - 30.0,
                width,
                height,
            );
            spec.image(rect);
            spec.text(50.0, 50.0, Font::Regular, 12.0, Color::BLACK, format!("Student Name: {student_name}"));
            spec.text(
                50.0,
                30.0,
                Font::Regular,
                12.0,
                Color::BLACK,
                format!("Application ID: {}", ctx.application_id),
            );
        }
        AttachmentKind::IdProof => {
            draw_id_proof(&mut spec, index, total, width, height, student_name, ctx);
        }
        AttachmentKind::Signature => {
            draw_simple_header(&mut spec, "DIGITAL SIGNATURE");
            let rect = Rect::new((PAGE_WIDTH - width) / 2.0, (PAGE_HEIGHT - height) / 2.0, width, height);
            spec.image(rect);
            draw_declaration(&mut spec, student_name, ctx);
        }
    }

    Ok(ImagePage {
        kind,
        spec,
        image: prepared.encoded,
        resampled: prepared.resampled,
    })
}

/// Title of an ID-proof page. The sequence number is only shown when more
/// than one proof was submitted.
pub fn id_proof_title(index: usize, total: usize) -> String {
    if total > 1 {
        format!("IDENTITY PROOF DOCUMENT {}", index + 1)
    } else {
        "IDENTITY PROOF DOCUMENT".to_string()
    }
}

fn draw_simple_header(spec: &mut PageSpec, title: &str) {
    spec.fill_rect(Rect::new(0.0, PAGE_HEIGHT - 60.0, PAGE_WIDTH, 60.0), PAGE_HEADER_FILL);
    spec.text(50.0, PAGE_HEIGHT - 35.0, Font::Bold, 20.0, Color::WHITE, title);
}

fn draw_id_proof(
    spec: &mut PageSpec,
    index: usize,
    total: usize,
    width: f32,
    height: f32,
    student_name: &str,
    ctx: &RenderContext<'_>,
) {
    let header_height = 80.0;
    spec.fill_rect(
        Rect::new(0.0, PAGE_HEIGHT - header_height, PAGE_WIDTH, header_height),
        ID_HEADER_FILL,
    );
    spec.line(
        (0.0, PAGE_HEIGHT - header_height),
        (PAGE_WIDTH, PAGE_HEIGHT - header_height),
        Color::gray(0.8),
        2.0,
    );
    spec.centered_text(PAGE_HEIGHT - 35.0, Font::Bold, 24.0, Color::WHITE, id_proof_title(index, total));
    spec.centered_text(
        PAGE_HEIGHT - 55.0,
        Font::Regular,
        12.0,
        Color::WHITE,
        "Official Verification Document",
    );

    let margin_top = 100.0;
    let mut image_y = PAGE_HEIGHT - margin_top - height - 20.0;

    // The info block never drops into the disclaimer; a tall image moves up
    // into the gap under the header instead.
    let info_y = (image_y - 40.0).max(ID_INFO_MIN_Y);
    image_y = image_y.max(info_y + 20.0 + ID_FRAME_WIDTH + 5.0);

    let image_rect = Rect::new((PAGE_WIDTH - width) / 2.0, image_y, width, height);
    spec.stroke_rect(image_rect.expand(ID_FRAME_WIDTH), Color::gray(0.3), ID_FRAME_WIDTH);
    spec.image(image_rect);

    spec.panel(
        Rect::new(50.0, info_y - 60.0, PAGE_WIDTH - 100.0, 80.0),
        Color::gray(0.95),
        Color::gray(0.7),
        1.0,
    );
    spec.text(
        70.0,
        info_y - 15.0,
        Font::Bold,
        14.0,
        Color::BLACK,
        format!("DOCUMENT INFORMATION - ID Proof {}", index + 1),
    );
    spec.text(70.0, info_y - 35.0, Font::Regular, 11.0, Color::BLACK, format!("Student Name: {student_name}"));
    spec.text(
        70.0,
        info_y - 50.0,
        Font::Regular,
        11.0,
        Color::BLACK,
        format!("Application ID: {}", ctx.application_id),
    );
    spec.text(
        PAGE_WIDTH - 250.0,
        info_y - 35.0,
        Font::Regular,
        11.0,
        Color::BLACK,
        format!("Verification Date: {}", verification_stamp(ctx.generated_at)),
    );
    spec.text(
        PAGE_WIDTH - 250.0,
        info_y - 50.0,
        Font::Regular,
        11.0,
        Color::BLACK,
        "Image Quality: High Resolution",
    );

    spec.centered_text(
        ID_DISCLAIMER_Y,
        Font::Oblique,
        10.0,
        Color::gray(0.5),
        "This document is digitally verified and authenticated",
    );
}

fn draw_declaration(spec: &mut PageSpec, student_name: &str, ctx: &RenderContext<'_>) {
    spec.text(50.0, 150.0, Font::Bold, 14.0, Color::BLACK, "DECLARATION:");
    spec.text(
        50.0,
        130.0,
        Font::Regular,
        12.0,
        Color::BLACK,
        "I hereby declare that all the information provided above is true and correct",
    );
    spec.text(
        50.0,
        116.0,
        Font::Regular,
        12.0,
        Color::BLACK,
        "to the best of my knowledge.",
    );
    spec.text(50.0, 96.0, Font::Regular, 12.0, Color::BLACK, format!("Student Name: {student_name}"));
    spec.text(
        50.0,
        80.0,
        Font::Regular,
        12.0,
        Color::BLACK,
        format!("Date: {}", ctx.generated_at.format("%d/%m/%Y")),
    );
    spec.text(
        50.0,
        64.0,
        Font::Regular,
        12.0,
        Color::BLACK,
        format!("Application ID: {}", ctx.application_id),
    );
}

fn verification_stamp(at: NaiveDateTime) -> String {
    at.format("%d/%m/%Y %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::canvas::DrawOp;
    use crate::document::codec::Budget;
    use crate::document::common::ApplicationId;
    use crate::document::DocumentBranding;
    use base64::Engine;
    use chrono::NaiveDate;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn png_uri(width: u32, height: u32) -> String {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
        )
    }

    fn with_context<T>(f: impl FnOnce(&RenderContext<'_>) -> T) -> T {
        let at = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_hms_opt(8, 0, 5).unwrap();
        let id = ApplicationId::from_time(&at.and_utc());
        let branding = DocumentBranding::default();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        f(&ctx)
    }

    #[test]
    fn test_id_proof_titles() {
        assert_eq!(id_proof_title(0, 1), "IDENTITY PROOF DOCUMENT");
        assert_eq!(id_proof_title(0, 2), "IDENTITY PROOF DOCUMENT 1");
        assert_eq!(id_proof_title(1, 2), "IDENTITY PROOF DOCUMENT 2");
    }

    #[test]
    fn test_id_proof_page_frames_image_outward() {
        let form = FormRecord { full_name: Some("Asha Rao".into()), ..Default::default() };
        let page = with_context(|ctx| {
            render_image_page(AttachmentKind::IdProof, &png_uri(200, 100), 0, 2, &form, ctx).unwrap()
        });

        let image_rect = page.spec.image_rect().unwrap();
        assert_eq!((image_rect.width, image_rect.height), (200.0, 100.0));
        assert!(!page.resampled);

        let frame = page
            .spec
            .ops()
            .iter()
            .find_map(|op| match op {
                DrawOp::StrokeRect { rect, line_width, .. } => Some((*rect, *line_width)),
                _ => None,
            })
            .unwrap();
        assert_eq!(frame.0, image_rect.expand(3.0));
        assert_eq!(frame.1, 3.0);

        assert!(page.spec.contains_text("IDENTITY PROOF DOCUMENT 1"));
        assert!(page.spec.contains_text("Student Name: Asha Rao"));
        assert!(page.spec.contains_text("Verification Date: 01/06/2025 08:00:05"));
        assert!(page.spec.contains_text("Image Quality: High Resolution"));
        assert!(page.spec.contains_text("digitally verified and authenticated"));
    }

    #[test]
    fn test_tall_id_proof_keeps_info_clear_of_disclaimer() {
        let page = with_context(|ctx| {
            render_image_page(AttachmentKind::IdProof, &png_uri(100, 1400), 0, 1, &FormRecord::default(), ctx)
                .unwrap()
        });
        let budget = Budget::for_kind(AttachmentKind::IdProof);
        let image_rect = page.spec.image_rect().unwrap();
        assert!((image_rect.height - budget.max_height.floor()).abs() < 1.0);

        let info_panel = page
            .spec
            .ops()
            .iter()
            .find_map(|op| match op {
                DrawOp::FillRect { rect, outline: Some(_), .. } if rect.x == 50.0 => Some(*rect),
                _ => None,
            })
            .unwrap();
        let frame = image_rect.expand(ID_FRAME_WIDTH);

        assert!(info_panel.y >= ID_DISCLAIMER_Y + 10.0);
        assert!(info_panel.y + info_panel.height < frame.y);
        assert!(frame.y + frame.height < PAGE_HEIGHT - 80.0);

        let info_baselines: Vec<f32> = page
            .spec
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, text, .. }
                    if text.starts_with("Student Name") || text.starts_with("Image Quality") =>
                {
                    Some(*y)
                }
                _ => None,
            })
            .collect();
        assert_eq!(info_baselines.len(), 2);
        assert!(info_baselines.iter().all(|&y| y > ID_DISCLAIMER_Y + 10.0));
    }

    #[test]
    fn test_photo_page_fits_budget_and_is_centered() {
        let page = with_context(|ctx| {
            render_image_page(AttachmentKind::Photo, &png_uri(300, 400), 0, 1, &FormRecord::default(), ctx)
                .unwrap()
        });
        let rect = page.spec.image_rect().unwrap();
        let budget = Budget::for_kind(AttachmentKind::Photo);
        assert!(rect.width <= budget.max_width && rect.height <= budget.max_height);
        assert!((rect.x + rect.width / 2.0 - PAGE_WIDTH / 2.0).abs() < 0.001);
        assert!(page.spec.contains_text("Student Name: N/A"));
        assert!(page.spec.contains_text("STUDENT PHOTO"));
    }

    #[test]
    fn test_signature_page_has_declaration() {
        let page = with_context(|ctx| {
            render_image_page(AttachmentKind::Signature, &png_uri(400, 100), 0, 1, &FormRecord::default(), ctx)
                .unwrap()
        });
        assert!(page.spec.contains_text("DIGITAL SIGNATURE"));
        assert!(page.spec.contains_text("DECLARATION:"));
        assert!(page.spec.contains_text("Date: 01/06/2025"));
        let rect = page.spec.image_rect().unwrap();
        assert!(rect.y >= 150.0 - 0.001);
    }

    #[test]
    fn test_malformed_uri_is_page_error() {
        let result = with_context(|ctx| {
            render_image_page(AttachmentKind::Signature, "data:image/png;base64,@@@@", 0, 1, &FormRecord::default(), ctx)
        });
        assert!(matches!(result, Err(PageError::Decode(_))));
    }
}
