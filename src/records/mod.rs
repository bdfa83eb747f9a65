//! Records module - persistence of submitted applications.
//!
//! - `properties` - Notion property JSON for the applications database
//! - `notion` - `RecordStore` over the Notion REST API
//! - `database_id` - on-disk cache of the active database ID
//! - `directory` - resolves the active database and saves submissions

pub mod database_id;
pub mod directory;
pub mod notion;
pub mod properties;

pub use database_id::DatabaseIdStore;
pub use directory::{ConnectionProbe, RecordDirectory, SavedApplication};
pub use notion::NotionClient;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::document::ApplicationId;
use crate::form::FormRecord;

pub const STATUS_PENDING: &str = "Pending Review";
pub const STATUS_APPROVED: &str = "Approved";
pub const STATUS_REJECTED: &str = "Rejected";

/// Marker Notion puts in the error message when a page ID is used as a
/// database ID.
const PAGE_NOT_DATABASE: &str = "is a page, not a database";

/// Canonical hyphenated form of a Notion page ID, or `None` when `raw` is
/// not a UUID. Page IDs end up in request paths, so nothing else gets through.
pub fn normalize_page_id(raw: &str) -> Option<String> {
    uuid::Uuid::parse_str(raw.trim())
        .ok()
        .map(|id| id.hyphenated().to_string())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Notion not configured")]
    NotConfigured,
    #[error("request to Notion failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Notion API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    #[error("unexpected Notion response: {0}")]
    UnexpectedResponse(String),
    #[error("failed to create database: {0}")]
    DatabaseCreation(Box<StoreError>),
}

impl StoreError {
    /// Notion rejected a database call because the ID belongs to a page.
    pub fn is_page_not_database(&self) -> bool {
        match self {
            StoreError::Api { message, .. } => message.contains(PAGE_NOT_DATABASE),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Api { status: 404, .. })
    }
}

/// One stored application as shown in the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationRecord {
    /// Notion page ID.
    pub id: String,
    pub student_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub relation: String,
    pub room_number: String,
    pub admission_date: String,
    pub stay_duration: String,
    pub emergency_contact: String,
    #[schema(example = "Pending Review")]
    pub status: String,
    pub submission_date: String,
    #[schema(example = "HA-20250115143000")]
    pub application_id: String,
}

/// Partial update of a stored application. Absent or empty fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApplicationUpdate {
    pub student_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub relation: Option<String>,
    pub room_number: Option<String>,
    pub admission_date: Option<String>,
    pub stay_duration: Option<String>,
    pub emergency_contact: Option<String>,
    pub status: Option<String>,
}

impl ApplicationUpdate {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DatabaseInfo {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageInfo {
    pub id: String,
    pub title: String,
}

/// Everything the service needs from the record store.
#[async_trait]
pub trait RecordStore {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo, StoreError>;

    /// Create the applications database as a child of `parent_page_id`.
    async fn create_database(&self, parent_page_id: &str) -> Result<DatabaseInfo, StoreError>;

    async fn retrieve_page(&self, page_id: &str) -> Result<PageInfo, StoreError>;

    /// Store one submission and return the new page ID.
    async fn create_application(
        &self,
        database_id: &str,
        form: &FormRecord,
        application_id: &ApplicationId,
        submitted_at: NaiveDateTime,
    ) -> Result<String, StoreError>;

    /// All applications, newest submission first, optionally restricted to one
    /// status.
    async fn query_applications(
        &self,
        database_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<ApplicationRecord>, StoreError>;

    async fn get_application(&self, page_id: &str) -> Result<ApplicationRecord, StoreError>;

    async fn update_application(&self, page_id: &str, update: &ApplicationUpdate) -> Result<(), StoreError>;

    async fn archive_application(&self, page_id: &str) -> Result<(), StoreError>;
}
