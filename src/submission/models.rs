use serde::Serialize;
use utoipa::ToSchema;

use crate::document::SkippedPage;

pub const SUBMITTED_MESSAGE: &str = "Application submitted successfully!";

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    /// Application ID stored in Notion, or the document's own ID when the
    /// record was not saved.
    #[schema(example = "HA-20250115143000")]
    pub application_id: String,
    /// ID printed inside the PDF. May differ from `application_id` by a
    /// second or two.
    #[schema(example = "HA-20250115143000")]
    pub document_application_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_message_id: Option<i64>,
    pub pdf_pages: usize,
    pub skipped_pages: Vec<SkippedPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notion_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_warning: Option<String>,
}

/// Neither Notion nor Telegram accepted the submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionFailure {
    pub success: bool,
    pub error: String,
    pub notion_error: String,
    pub telegram_error: String,
    pub document_application_id: String,
}
