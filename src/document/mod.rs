//! Document module - renders an admission form into a paginated PDF.
//!
//! The pipeline has three stages:
//! - `layout` - the fixed summary page (student, guardian, hostel and
//!   attachment sections plus footer)
//! - `image_page` - one page per attachment (photo, ID proofs, signature)
//! - `assembler` - sequences the pages and serializes them through `writer`

pub mod assembler;
pub mod canvas;
pub mod codec;
pub mod common;
pub mod image_page;
pub mod layout;
pub mod writer;

pub use assembler::{build_document, DocumentBranding, DocumentBuilder};
pub use common::ApplicationId;

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Attachment classes that get a dedicated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Photo,
    IdProof,
    Signature,
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttachmentKind::Photo => "student photo",
            AttachmentKind::IdProof => "ID proof",
            AttachmentKind::Signature => "signature",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Summary,
    Photo,
    IdProof,
    Signature,
}

impl From<AttachmentKind> for PageKind {
    fn from(kind: AttachmentKind) -> Self {
        match kind {
            AttachmentKind::Photo => PageKind::Photo,
            AttachmentKind::IdProof => PageKind::IdProof,
            AttachmentKind::Signature => PageKind::Signature,
        }
    }
}

/// An attachment field was present but could not be turned into an image.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("data URI has no ',' separating metadata from payload")]
    MissingPayload,
    #[error("invalid base64 payload: {0}")]
    Base64(#[source] base64::DecodeError),
    #[error("payload is not a readable image: {0}")]
    Image(#[source] image::ImageError),
    #[error("image has zero width or height")]
    EmptyImage,
}

/// Re-encoding a decoded image failed.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[source] image::ImageError),
    #[error("deflate compression failed: {0}")]
    Deflate(#[source] std::io::Error),
}

/// Failure scoped to a single attachment page. The page is skipped.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Failure of the output document itself. No document is produced.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to encode page content stream: {0}")]
    Content(#[source] lopdf::Error),
    #[error("failed to serialize PDF document: {0}")]
    Serialize(String),
}

/// An attachment page that was left out of the document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedPage {
    pub kind: AttachmentKind,
    /// Position among attachments of the same kind, starting at 1.
    pub index: usize,
    pub reason: String,
}

/// Result of a successful document build.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub pdf: Vec<u8>,
    pub application_id: ApplicationId,
    pub pages: Vec<PageKind>,
    pub skipped: Vec<SkippedPage>,
}

impl GeneratedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
