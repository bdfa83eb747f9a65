//! Summary page layout.
//!
//! Sections are stacked top-down with a running cursor. Each section draws an
//! outlined panel, a heading and one label/value row per field.

use chrono::NaiveDateTime;

use super::assembler::DocumentBranding;
use super::canvas::{Color, Font, PageSpec, Rect, PAGE_HEIGHT, PAGE_WIDTH};
use super::common::{title_case, truncate_chars, ApplicationId, STUDENT_VALUE_MAX_CHARS};
use crate::form::models::FormRecord;

pub const HEADER_HEIGHT: f32 = 70.0;
pub const FOOTER_HEIGHT: f32 = 80.0;

const HEADER_FILL: Color = Color::rgb(0.2, 0.3, 0.6);
const STUDENT_FILL: Color = Color::rgb(0.9, 0.9, 1.0);
const GUARDIAN_FILL: Color = Color::rgb(0.9, 1.0, 0.9);
const HOSTEL_FILL: Color = Color::rgb(1.0, 0.95, 0.9);
const ATTACHMENTS_FILL: Color = Color::gray(0.95);
const ATTACHMENTS_MIN_HEIGHT: f32 = 80.0;
const ATTACHMENT_FIRST_LINE: f32 = 55.0;
const ATTACHMENT_LINE_PITCH: f32 = 15.0;
const ATTACHMENT_BOTTOM_PADDING: f32 = 15.0;
const FOOTER_FILL: Color = Color::gray(0.9);

const PANEL_X: f32 = 30.0;
const HEADING_X: f32 = 40.0;
const LABEL_X: f32 = 45.0;
const VALUE_X: f32 = 150.0;
const ROW_PITCH: f32 = 18.0;
const FIRST_ROW_OFFSET: f32 = 35.0;

/// Values shared by every page of one document.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub application_id: &'a ApplicationId,
    pub generated_at: NaiveDateTime,
    pub branding: &'a DocumentBranding,
}

/// Where each submitted attachment ended up. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentEntry {
    Photo { page: Option<usize> },
    IdProofs { pages: Vec<usize>, failed: usize },
    Signature { page: Option<usize> },
}

impl AttachmentEntry {
    /// Line printed in the attachments section.
    pub fn summary_line(&self) -> String {
        match self {
            AttachmentEntry::Photo { page } => single_line("Student Photo", *page),
            AttachmentEntry::Signature { page } => single_line("Digital Signature", *page),
            AttachmentEntry::IdProofs { pages, failed } => {
                let label = if pages.len() + failed > 1 {
                    "ID Proof Documents"
                } else {
                    "ID Proof Document"
                };
                let placement = match (pages.first(), pages.last()) {
                    (Some(first), Some(last)) if first == last => format!("Page {first}"),
                    (Some(first), Some(last)) => format!("Pages {first}-{last}"),
                    _ => return format!("• {label} (could not be rendered)"),
                };
                if *failed > 0 {
                    format!("• {label} ({placement}; {failed} could not be rendered)")
                } else {
                    format!("• {label} ({placement})")
                }
            }
        }
    }
}

fn single_line(label: &str, page: Option<usize>) -> String {
    match page {
        Some(page) => format!("• {label} (Page {page})"),
        None => format!("• {label} (could not be rendered)"),
    }
}

/// Render the first page of the document.
pub fn render_summary_page(form: &FormRecord, ctx: &RenderContext<'_>, attachments: &[AttachmentEntry]) -> PageSpec {
    let mut page = PageSpec::new();

    draw_header(&mut page, ctx);

    let mut cursor = PAGE_HEIGHT - 120.0;

    let student_rows = [
        ("Full Name", FormRecord::text(&form.full_name).to_string()),
        ("Date of Birth", FormRecord::text(&form.date_of_birth).to_string()),
        ("Gender", title_case(FormRecord::text(&form.gender))),
        ("Email Address", FormRecord::text(&form.email).to_string()),
        ("Phone Number", FormRecord::text(&form.phone).to_string()),
        ("Address", FormRecord::text(&form.address).to_string()),
    ]
    .map(|(label, value)| (label, truncate_chars(&value, STUDENT_VALUE_MAX_CHARS).to_string()));
    draw_section(&mut page, &mut cursor, "STUDENT DETAILS", 150.0, STUDENT_FILL, &student_rows);
    cursor -= 20.0;

    let guardian_rows = [
        ("Guardian Name", FormRecord::text(&form.guardian_name).to_string()),
        ("Relation", title_case(FormRecord::text(&form.relation))),
        ("Guardian Phone", FormRecord::text(&form.guardian_phone).to_string()),
        ("Emergency Contact", FormRecord::text(&form.emergency_contact).to_string()),
    ];
    draw_section(&mut page, &mut cursor, "GUARDIAN DETAILS", 100.0, GUARDIAN_FILL, &guardian_rows);
    cursor -= 20.0;

    let hostel_rows = [
        ("Room Number", FormRecord::text(&form.room_number).to_string()),
        ("Admission Date", FormRecord::text(&form.admission_date).to_string()),
        ("Stay Duration", FormRecord::text(&form.stay_duration).to_string()),
    ];
    draw_section(&mut page, &mut cursor, "HOSTEL DETAILS", 80.0, HOSTEL_FILL, &hostel_rows);
    cursor -= 30.0;

    draw_attachments(&mut page, cursor, attachments);
    draw_footer(&mut page, ctx);

    page
}

fn draw_header(page: &mut PageSpec, ctx: &RenderContext<'_>) {
    page.fill_rect(
        Rect::new(0.0, PAGE_HEIGHT - HEADER_HEIGHT, PAGE_WIDTH, HEADER_HEIGHT),
        HEADER_FILL,
    );
    page.text(
        50.0,
        PAGE_HEIGHT - 30.0,
        Font::Bold,
        22.0,
        Color::WHITE,
        ctx.branding.institution_name.to_uppercase(),
    );
    page.text(
        50.0,
        PAGE_HEIGHT - 50.0,
        Font::Bold,
        14.0,
        Color::WHITE,
        ctx.branding.form_title.as_str(),
    );

    page.text(
        50.0,
        PAGE_HEIGHT - 85.0,
        Font::Regular,
        9.0,
        Color::BLACK,
        format!("Application ID: {}", ctx.application_id),
    );
    page.text(
        50.0,
        PAGE_HEIGHT - 100.0,
        Font::Regular,
        9.0,
        Color::BLACK,
        format!("Generated on: {}", ctx.generated_at.format("%B %d, %Y")),
    );
}

fn draw_section(
    page: &mut PageSpec,
    cursor: &mut f32,
    heading: &str,
    height: f32,
    fill: Color,
    rows: &[(&str, String)],
) {
    page.panel(
        Rect::new(PANEL_X, *cursor - height, PAGE_WIDTH - 2.0 * PANEL_X, height),
        fill,
        Color::BLACK,
        1.0,
    );
    page.text(HEADING_X, *cursor - 20.0, Font::Bold, 14.0, Color::BLACK, heading);
    *cursor -= FIRST_ROW_OFFSET;

    for (label, value) in rows {
        page.text(LABEL_X, *cursor, Font::Bold, 10.0, Color::BLACK, format!("{label}:"));
        page.text(VALUE_X, *cursor, Font::Regular, 9.0, Color::BLACK, value.as_str());
        *cursor -= ROW_PITCH;
    }
}

fn draw_attachments(page: &mut PageSpec, top: f32, attachments: &[AttachmentEntry]) {
    let lines: Vec<String> = if attachments.is_empty() {
        vec!["• No attachments provided".to_string()]
    } else {
        attachments.iter().map(AttachmentEntry::summary_line).collect()
    };

    // the panel grows so the last line keeps a bottom padding
    let last_line = ATTACHMENT_FIRST_LINE + (lines.len() - 1) as f32 * ATTACHMENT_LINE_PITCH;
    let height = (last_line + ATTACHMENT_BOTTOM_PADDING).max(ATTACHMENTS_MIN_HEIGHT);
    page.panel(
        Rect::new(PANEL_X, top - height, PAGE_WIDTH - 2.0 * PANEL_X, height),
        ATTACHMENTS_FILL,
        Color::BLACK,
        1.0,
    );
    page.text(HEADING_X, top - 20.0, Font::Bold, 14.0, Color::BLACK, "ATTACHMENTS");
    page.text(
        50.0,
        top - 40.0,
        Font::Regular,
        11.0,
        Color::BLACK,
        "The following attachments are included on separate pages:",
    );

    for (i, line) in lines.into_iter().enumerate() {
        let y = top - ATTACHMENT_FIRST_LINE - i as f32 * ATTACHMENT_LINE_PITCH;
        page.text(50.0, y, Font::Regular, 11.0, Color::BLACK, line);
    }
}

fn draw_footer(page: &mut PageSpec, ctx: &RenderContext<'_>) {
    page.panel(
        Rect::new(0.0, 0.0, PAGE_WIDTH, FOOTER_HEIGHT),
        FOOTER_FILL,
        Color::BLACK,
        1.0,
    );

    page.text(50.0, FOOTER_HEIGHT - 20.0, Font::Bold, 10.0, Color::BLACK, "IMPORTANT NOTES:");
    page.text(
        50.0,
        FOOTER_HEIGHT - 35.0,
        Font::Regular,
        8.0,
        Color::BLACK,
        "• This is a computer-generated document and does not require manual signature.",
    );
    page.text(
        50.0,
        FOOTER_HEIGHT - 50.0,
        Font::Regular,
        8.0,
        Color::BLACK,
        "• Please keep this document for your records and admission process.",
    );

    let right = [
        format!("Generated: {}", ctx.generated_at.format("%d/%m/%Y at %H:%M")),
        format!("{} Management System", ctx.branding.institution_name),
        format!("Contact: {}", ctx.branding.contact_email),
        format!("App ID: {}", ctx.application_id),
    ];
    for (i, line) in right.into_iter().enumerate() {
        page.text(350.0, FOOTER_HEIGHT - 20.0 - i as f32 * 15.0, Font::Oblique, 8.0, Color::BLACK, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::canvas::DrawOp;
    use chrono::NaiveDate;

    fn context_parts() -> (ApplicationId, NaiveDateTime, DocumentBranding) {
        let at = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        (
            ApplicationId::from_time(&at.and_utc()),
            at,
            DocumentBranding::default(),
        )
    }

    fn value_at_row(page: &PageSpec, label: &str) -> String {
        let ops = page.ops();
        let index = ops
            .iter()
            .position(|op| matches!(op, DrawOp::Text { text, .. } if text == &format!("{label}:")))
            .expect("label present");
        match &ops[index + 1] {
            DrawOp::Text { text, .. } => text.clone(),
            other => panic!("expected value text, got {other:?}"),
        }
    }

    #[test]
    fn test_student_values_truncated_to_fifty_chars() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let form = FormRecord {
            address: Some("x".repeat(80)),
            email: Some("e".repeat(50)),
            guardian_name: Some("g".repeat(80)),
            room_number: Some("r".repeat(70)),
            ..Default::default()
        };

        let page = render_summary_page(&form, &ctx, &[]);
        assert_eq!(value_at_row(&page, "Address"), "x".repeat(50));
        assert_eq!(value_at_row(&page, "Email Address"), "e".repeat(50));
        assert_eq!(value_at_row(&page, "Guardian Name"), "g".repeat(80));
        assert_eq!(value_at_row(&page, "Room Number"), "r".repeat(70));
    }

    #[test]
    fn test_gender_and_relation_are_title_cased() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let form = FormRecord {
            gender: Some("female".into()),
            relation: Some("MOTHER".into()),
            ..Default::default()
        };

        let page = render_summary_page(&form, &ctx, &[]);
        assert_eq!(value_at_row(&page, "Gender"), "Female");
        assert_eq!(value_at_row(&page, "Relation"), "Mother");
    }

    #[test]
    fn test_field_order_and_missing_values() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let page = render_summary_page(&FormRecord::default(), &ctx, &[]);

        let labels: Vec<&str> = page
            .texts()
            .filter(|t| t.ends_with(':') && !t.contains("NOTES") && !t.starts_with("The following"))
            .collect();
        assert_eq!(
            labels,
            vec![
                "Full Name:", "Date of Birth:", "Gender:", "Email Address:", "Phone Number:", "Address:",
                "Guardian Name:", "Relation:", "Guardian Phone:", "Emergency Contact:",
                "Room Number:", "Admission Date:", "Stay Duration:",
            ]
        );
        assert_eq!(value_at_row(&page, "Full Name"), "");
        assert!(page.contains_text("• No attachments provided"));
    }

    #[test]
    fn test_metadata_and_footer_restate_id() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let page = render_summary_page(&FormRecord::default(), &ctx, &[]);

        assert!(page.contains_text("Application ID: HA-20250115143000"));
        assert!(page.contains_text("Generated on: January 15, 2025"));
        assert!(page.contains_text("Generated: 15/01/2025 at 14:30"));
        assert!(page.contains_text("App ID: HA-20250115143000"));
    }

    #[test]
    fn test_attachment_lines() {
        let photo = AttachmentEntry::Photo { page: Some(2) };
        assert_eq!(photo.summary_line(), "• Student Photo (Page 2)");

        let ids = AttachmentEntry::IdProofs { pages: vec![3, 4], failed: 0 };
        assert_eq!(ids.summary_line(), "• ID Proof Documents (Pages 3-4)");

        let one_id = AttachmentEntry::IdProofs { pages: vec![2], failed: 0 };
        assert_eq!(one_id.summary_line(), "• ID Proof Document (Page 2)");

        let partial = AttachmentEntry::IdProofs { pages: vec![2], failed: 1 };
        assert_eq!(partial.summary_line(), "• ID Proof Documents (Page 2; 1 could not be rendered)");

        let broken = AttachmentEntry::Signature { page: None };
        assert_eq!(broken.summary_line(), "• Digital Signature (could not be rendered)");
    }

    #[test]
    fn test_attachment_panel_holds_every_line() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let attachments = [
            AttachmentEntry::Photo { page: Some(2) },
            AttachmentEntry::IdProofs { pages: vec![3, 4], failed: 0 },
            AttachmentEntry::Signature { page: Some(5) },
        ];
        let page = render_summary_page(&FormRecord::default(), &ctx, &attachments);

        let panel = page
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, outline: Some(_), .. } if rect.x == PANEL_X => Some(*rect),
                _ => None,
            })
            .last()
            .expect("attachments panel");
        let baselines: Vec<f32> = page
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { y, text, .. } if text.starts_with("• ") && *y > FOOTER_HEIGHT => Some(*y),
                _ => None,
            })
            .collect();

        assert_eq!(baselines.len(), 3);
        assert!(baselines.iter().all(|&y| y >= panel.y + 10.0 && y <= panel.y + panel.height));
        assert!(panel.y > FOOTER_HEIGHT);
    }

    #[test]
    fn test_sections_stack_downwards() {
        let (id, at, branding) = context_parts();
        let ctx = RenderContext { application_id: &id, generated_at: at, branding: &branding };
        let page = render_summary_page(&FormRecord::default(), &ctx, &[]);

        let panel_tops: Vec<f32> = page
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect { rect, outline: Some(_), .. } if rect.x == PANEL_X => Some(rect.y + rect.height),
                _ => None,
            })
            .collect();
        assert_eq!(panel_tops.len(), 4);
        assert!(panel_tops.windows(2).all(|pair| pair[0] > pair[1]));
        assert!((panel_tops[0] - (PAGE_HEIGHT - 120.0)).abs() < 0.001);
    }
}
