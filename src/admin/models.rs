use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::export::ExportFormat;
use crate::db::{ApplicationStats, BulkUpdateOutcome};
use crate::records::ApplicationRecord;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusUpdateRequest {
    #[schema(example = "Approved")]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ExportRequest {
    #[serde(default)]
    pub format: ExportFormat,
    /// Only export applications with this status.
    pub status_filter: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub application_ids: Vec<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationListResponse {
    pub success: bool,
    pub applications: Vec<ApplicationRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub success: bool,
    pub application: ApplicationRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: ApplicationStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    pub success: bool,
    /// CSV text, or an array of row objects for JSON exports.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    #[schema(example = "applications_export_20250115_143000.csv")]
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub updated_count: usize,
    pub total_count: usize,
    pub errors: Vec<String>,
}

impl From<BulkUpdateOutcome> for BulkUpdateResponse {
    fn from(outcome: BulkUpdateOutcome) -> Self {
        Self {
            success: true,
            updated_count: outcome.updated_count,
            total_count: outcome.total_count,
            errors: outcome.errors,
        }
    }
}

/// Active database summary. IDs are shortened to their first 8 characters.
#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStatusResponse {
    pub success: bool,
    #[schema(example = "1a2b3c4d...")]
    pub database_id: String,
    pub database_title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_id_stored: Option<bool>,
}

/// What the configured Notion ID points at.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConnectionTestResponse {
    pub success: bool,
    /// `database` or `page`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateDatabaseResponse {
    pub success: bool,
    pub database_id: String,
    pub database_title: String,
    pub message: String,
    /// `true` when the active database already existed.
    pub existing: bool,
}
