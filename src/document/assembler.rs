//! Document assembly: composes attachment pages, plans page numbers, renders
//! the summary page and hands everything to the PDF writer in a fixed order.

use chrono::{Local, NaiveDateTime};

use super::common::{filename_prefix, ApplicationId};
use super::image_page::{render_image_page, ImagePage};
use super::layout::{render_summary_page, AttachmentEntry, RenderContext};
use super::writer::{write_pdf, PdfPage};
use super::{AttachmentKind, BuildError, GeneratedDocument, PageKind, SkippedPage};
use crate::form::models::FormRecord;

pub const DEFAULT_INSTITUTION_NAME: &str = "Navadaya Girls Hostel";
pub const DEFAULT_FORM_TITLE: &str = "Student Admission Form";
pub const DEFAULT_CONTACT_EMAIL: &str = "admission@university.edu";

/// Institution text printed on every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBranding {
    pub institution_name: String,
    pub form_title: String,
    pub contact_email: String,
}

impl Default for DocumentBranding {
    fn default() -> Self {
        Self {
            institution_name: DEFAULT_INSTITUTION_NAME.to_string(),
            form_title: DEFAULT_FORM_TITLE.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
        }
    }
}

impl DocumentBranding {
    /// Prefix used in generated file names, e.g. `NavadayaGirlsHostel`.
    pub fn file_prefix(&self) -> String {
        filename_prefix(&self.institution_name)
    }
}

/// Builds admission documents with a fixed branding.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    branding: DocumentBranding,
}

impl DocumentBuilder {
    pub fn new(branding: DocumentBranding) -> Self {
        Self { branding }
    }

    pub fn branding(&self) -> &DocumentBranding {
        &self.branding
    }

    /// Build a document stamped with the current local time.
    pub fn build(&self, form: &FormRecord) -> Result<GeneratedDocument, BuildError> {
        self.build_at(form, Local::now().naive_local())
    }

    /// Build a document as of `generated_at`. The application ID is derived
    /// from the same instant.
    pub fn build_at(&self, form: &FormRecord, generated_at: NaiveDateTime) -> Result<GeneratedDocument, BuildError> {
        let application_id = ApplicationId::from_time(&generated_at.and_utc());
        let ctx = RenderContext {
            application_id: &application_id,
            generated_at,
            branding: &self.branding,
        };

        let mut attachment_pages = Vec::new();
        let mut skipped = Vec::new();
        for job in attachment_jobs(form) {
            match render_image_page(job.kind, job.data_uri, job.index, job.total, form, &ctx) {
                Ok(page) => attachment_pages.push(page),
                Err(e) => {
                    log::warn!(
                        "Skipping {} page {}/{} for {}: {}",
                        job.kind,
                        job.index + 1,
                        job.total,
                        application_id,
                        e
                    );
                    skipped.push(SkippedPage {
                        kind: job.kind,
                        index: job.index + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let entries = plan_attachment_entries(form, &attachment_pages);
        let summary = render_summary_page(form, &ctx, &entries);

        let mut pages = Vec::with_capacity(attachment_pages.len() + 1);
        let mut kinds = Vec::with_capacity(attachment_pages.len() + 1);
        pages.push(PdfPage {
            spec: &summary,
            image: None,
        });
        kinds.push(PageKind::Summary);
        for page in &attachment_pages {
            pages.push(PdfPage {
                spec: &page.spec,
                image: Some(&page.image),
            });
            kinds.push(PageKind::from(page.kind));
        }

        let pdf = write_pdf(&pages, &self.branding.form_title)?;

        log::info!(
            "Built document {} ({} pages, {} skipped, {} bytes)",
            application_id,
            kinds.len(),
            skipped.len(),
            pdf.len()
        );

        Ok(GeneratedDocument {
            pdf,
            application_id,
            pages: kinds,
            skipped,
        })
    }
}

/// Build a document with the default branding.
pub fn build_document(form: &FormRecord) -> Result<GeneratedDocument, BuildError> {
    DocumentBuilder::default().build(form)
}

struct AttachmentJob<'a> {
    kind: AttachmentKind,
    data_uri: &'a str,
    index: usize,
    total: usize,
}

/// Attachment pages in emission order: photo, each ID proof, signature.
fn attachment_jobs(form: &FormRecord) -> Vec<AttachmentJob<'_>> {
    let mut jobs = Vec::new();

    if let Some(photo) = form.student_photo() {
        jobs.push(AttachmentJob {
            kind: AttachmentKind::Photo,
            data_uri: photo,
            index: 0,
            total: 1,
        });
    }

    let proofs = form.id_proofs();
    let total = proofs.len();
    for (index, proof) in proofs.into_iter().enumerate() {
        jobs.push(AttachmentJob {
            kind: AttachmentKind::IdProof,
            data_uri: proof,
            index,
            total,
        });
    }

    if let Some(signature) = form.signature() {
        jobs.push(AttachmentJob {
            kind: AttachmentKind::Signature,
            data_uri: signature,
            index: 0,
            total: 1,
        });
    }

    jobs
}

/// Attachment lines for the summary page, numbered from the pages that
/// actually rendered. The summary itself is page 1.
fn plan_attachment_entries(form: &FormRecord, rendered: &[ImagePage]) -> Vec<AttachmentEntry> {
    let page_numbers = |kind: AttachmentKind| -> Vec<usize> {
        rendered
            .iter()
            .enumerate()
            .filter(|(_, page)| page.kind == kind)
            .map(|(position, _)| position + 2)
            .collect()
    };

    let mut entries = Vec::new();

    if form.student_photo().is_some() {
        entries.push(AttachmentEntry::Photo {
            page: page_numbers(AttachmentKind::Photo).first().copied(),
        });
    }

    let submitted_proofs = form.id_proofs().len();
    if submitted_proofs > 0 {
        let pages = page_numbers(AttachmentKind::IdProof);
        let failed = submitted_proofs - pages.len();
        entries.push(AttachmentEntry::IdProofs { pages, failed });
    }

    if form.signature().is_some() {
        entries.push(AttachmentEntry::Signature {
            page: page_numbers(AttachmentKind::Signature).first().copied(),
        });
    }

    entries
}
