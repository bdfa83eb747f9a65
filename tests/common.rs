//! Shared fixtures: in-memory record store and messenger, image data URIs and
//! an `AppState` wired to both.
#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use hostel_admission_server::config::{AppConfig, TelegramConfig};
use hostel_admission_server::document::ApplicationId;
use hostel_admission_server::form::FormRecord;
use hostel_admission_server::messaging::{MessageReceipt, Messenger, MessengerError};
use hostel_admission_server::records::properties::DATABASE_TITLE;
use hostel_admission_server::records::{
    ApplicationRecord, ApplicationUpdate, DatabaseIdStore, DatabaseInfo, PageInfo, RecordDirectory, RecordStore,
    StoreError, STATUS_PENDING,
};
use hostel_admission_server::AppState;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const PARENT_PAGE_ID: &str = "6b1f0f6e-2c55-4a0c-9d0e-3f1e7b2a9c41";
pub const DATABASE_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";

fn not_found(kind: &str) -> StoreError {
    StoreError::Api {
        status: 404,
        code: "object_not_found".to_string(),
        message: format!("Could not find {kind}"),
    }
}

struct StoredApplication {
    database_id: String,
    record: ApplicationRecord,
    archived: bool,
}

#[derive(Default)]
struct StoreData {
    databases: HashMap<String, String>,
    pages: HashMap<String, String>,
    applications: Vec<StoredApplication>,
}

/// In-memory stand-in for Notion.
#[derive(Default)]
pub struct MockRecordStore {
    data: Arc<Mutex<StoreData>>,
    pub fail_writes: AtomicBool,
    pub queries: AtomicUsize,
    pub databases_created: AtomicUsize,
}

impl MockRecordStore {
    fn with_data(data: StoreData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
            ..Default::default()
        }
    }

    /// A store where `PARENT_PAGE_ID` is a page and no database exists yet.
    pub fn with_parent_page() -> Self {
        let mut data = StoreData::default();
        data.pages
            .insert(PARENT_PAGE_ID.to_string(), "Hostel Admin".to_string());
        Self::with_data(data)
    }

    /// A store where `DATABASE_ID` is already a database.
    pub fn with_database() -> Self {
        let mut data = StoreData::default();
        data.pages
            .insert(PARENT_PAGE_ID.to_string(), "Hostel Admin".to_string());
        data.databases
            .insert(DATABASE_ID.to_string(), DATABASE_TITLE.to_string());
        Self::with_data(data)
    }

    pub fn failing_writes(self) -> Self {
        self.fail_writes.store(true, Ordering::SeqCst);
        self
    }

    pub async fn drop_database(&self, id: &str) {
        self.data.lock().await.databases.remove(id);
    }

    pub async fn database_ids(&self) -> Vec<String> {
        self.data.lock().await.databases.keys().cloned().collect()
    }

    pub async fn insert_record(&self, database_id: &str, record: ApplicationRecord) {
        self.data.lock().await.applications.push(StoredApplication {
            database_id: database_id.to_string(),
            record,
            archived: false,
        });
    }

    pub async fn is_archived(&self, page_id: &str) -> bool {
        self.data
            .lock()
            .await
            .applications
            .iter()
            .any(|a| a.record.id == page_id && a.archived)
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Api {
                status: 503,
                code: "service_unavailable".to_string(),
                message: "Notion is unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn text(field: &Option<String>) -> String {
    FormRecord::text(field).to_string()
}

fn apply(record: &mut ApplicationRecord, update: &ApplicationUpdate) {
    let fields = [
        (&mut record.student_name, &update.student_name),
        (&mut record.email, &update.email),
        (&mut record.phone, &update.phone),
        (&mut record.date_of_birth, &update.date_of_birth),
        (&mut record.address, &update.address),
        (&mut record.guardian_name, &update.guardian_name),
        (&mut record.guardian_phone, &update.guardian_phone),
        (&mut record.relation, &update.relation),
        (&mut record.room_number, &update.room_number),
        (&mut record.admission_date, &update.admission_date),
        (&mut record.stay_duration, &update.stay_duration),
        (&mut record.emergency_contact, &update.emergency_contact),
        (&mut record.status, &update.status),
    ];
    for (target, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            *target = value.to_string();
        }
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo, StoreError> {
        let data = self.data.lock().await;
        if let Some(title) = data.databases.get(database_id) {
            return Ok(DatabaseInfo {
                id: database_id.to_string(),
                title: title.clone(),
            });
        }
        if data.pages.contains_key(database_id) {
            return Err(StoreError::Api {
                status: 400,
                code: "validation_error".to_string(),
                message: format!("Provided ID {database_id} is a page, not a database. Use the retrieve page API instead"),
            });
        }
        Err(not_found("database"))
    }

    async fn create_database(&self, parent_page_id: &str) -> Result<DatabaseInfo, StoreError> {
        self.check_writes()?;
        let mut data = self.data.lock().await;
        if !data.pages.contains_key(parent_page_id) {
            return Err(not_found("page"));
        }
        let id = uuid::Uuid::new_v4().to_string();
        data.databases.insert(id.clone(), DATABASE_TITLE.to_string());
        self.databases_created.fetch_add(1, Ordering::SeqCst);
        Ok(DatabaseInfo {
            id,
            title: DATABASE_TITLE.to_string(),
        })
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<PageInfo, StoreError> {
        let data = self.data.lock().await;
        data.pages
            .get(page_id)
            .map(|title| PageInfo {
                id: page_id.to_string(),
                title: title.clone(),
            })
            .ok_or_else(|| not_found("page"))
    }

    async fn create_application(
        &self,
        database_id: &str,
        form: &FormRecord,
        application_id: &ApplicationId,
        submitted_at: NaiveDateTime,
    ) -> Result<String, StoreError> {
        self.check_writes()?;
        let mut data = self.data.lock().await;
        if !data.databases.contains_key(database_id) {
            return Err(not_found("database"));
        }

        let page_id = uuid::Uuid::new_v4().to_string();
        data.applications.push(StoredApplication {
            database_id: database_id.to_string(),
            record: ApplicationRecord {
                id: page_id.clone(),
                student_name: text(&form.full_name),
                email: text(&form.email),
                phone: text(&form.phone),
                date_of_birth: text(&form.date_of_birth),
                address: text(&form.address),
                guardian_name: text(&form.guardian_name),
                guardian_phone: text(&form.guardian_phone),
                relation: text(&form.relation),
                room_number: text(&form.room_number),
                admission_date: text(&form.admission_date),
                stay_duration: text(&form.stay_duration),
                emergency_contact: text(&form.emergency_contact),
                status: STATUS_PENDING.to_string(),
                submission_date: submitted_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
                application_id: application_id.to_string(),
            },
            archived: false,
        });
        Ok(page_id)
    }

    async fn query_applications(
        &self,
        database_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().await;
        if !data.databases.contains_key(database_id) {
            return Err(not_found("database"));
        }
        let mut records: Vec<ApplicationRecord> = data
            .applications
            .iter()
            .filter(|a| a.database_id == database_id && !a.archived)
            .filter(|a| status.map_or(true, |s| a.record.status == s))
            .map(|a| a.record.clone())
            .collect();
        records.sort_by(|a, b| b.submission_date.cmp(&a.submission_date));
        Ok(records)
    }

    async fn get_application(&self, page_id: &str) -> Result<ApplicationRecord, StoreError> {
        let data = self.data.lock().await;
        data.applications
            .iter()
            .find(|a| a.record.id == page_id && !a.archived)
            .map(|a| a.record.clone())
            .ok_or_else(|| not_found("page"))
    }

    async fn update_application(&self, page_id: &str, update: &ApplicationUpdate) -> Result<(), StoreError> {
        self.check_writes()?;
        let mut data = self.data.lock().await;
        let stored = data
            .applications
            .iter_mut()
            .find(|a| a.record.id == page_id && !a.archived)
            .ok_or_else(|| not_found("page"))?;
        apply(&mut stored.record, update);
        Ok(())
    }

    async fn archive_application(&self, page_id: &str) -> Result<(), StoreError> {
        self.check_writes()?;
        let mut data = self.data.lock().await;
        let stored = data
            .applications
            .iter_mut()
            .find(|a| a.record.id == page_id)
            .ok_or_else(|| not_found("page"))?;
        stored.archived = true;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub caption: String,
}

/// Records everything it is asked to send.
#[derive(Default)]
pub struct MockMessenger {
    pub messages: Mutex<Vec<String>>,
    pub documents: Mutex<Vec<SentDocument>>,
    pub fail: AtomicBool,
}

impl MockMessenger {
    pub fn failing() -> Self {
        let messenger = Self::default();
        messenger.fail.store(true, Ordering::SeqCst);
        messenger
    }

    fn check(&self) -> Result<(), MessengerError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(MessengerError::Rejected("Bad Request: chat not found".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_message(&self, text: &str) -> Result<MessageReceipt, MessengerError> {
        self.check()?;
        let mut messages = self.messages.lock().await;
        messages.push(text.to_string());
        Ok(MessageReceipt {
            message_id: Some(messages.len() as i64),
        })
    }

    async fn send_document(&self, filename: &str, pdf: Vec<u8>, caption: &str) -> Result<MessageReceipt, MessengerError> {
        self.check()?;
        let mut documents = self.documents.lock().await;
        documents.push(SentDocument {
            filename: filename.to_string(),
            pdf,
            caption: caption.to_string(),
        });
        Ok(MessageReceipt {
            message_id: Some(100 + documents.len() as i64),
        })
    }
}

pub fn record_directory(store: Arc<MockRecordStore>, configured_id: &str, dir: &Path) -> RecordDirectory {
    RecordDirectory::new(store, configured_id, DatabaseIdStore::new(dir.join("notion_database_id.txt")))
}

/// App state over the mocks with `DATABASE_ID` configured. `store` of `None`
/// leaves Notion unconfigured.
pub fn test_state(store: Option<Arc<MockRecordStore>>, messenger: Arc<MockMessenger>, dir: &Path) -> web::Data<AppState> {
    test_state_with_id(store, DATABASE_ID, messenger, dir)
}

pub fn test_state_with_id(
    store: Option<Arc<MockRecordStore>>,
    configured_id: &str,
    messenger: Arc<MockMessenger>,
    dir: &Path,
) -> web::Data<AppState> {
    let config = AppConfig {
        telegram: Some(TelegramConfig {
            bot_token: "123:test".to_string(),
            chat_id: "-100".to_string(),
        }),
        database_id_file: dir.join("notion_database_id.txt"),
        ..Default::default()
    };
    let records = store.map(|store| Arc::new(record_directory(store, configured_id, dir)));
    web::Data::new(AppState::new_with_services(config, records, messenger))
}

fn data_uri(image: DynamicImage, format: ImageFormat, mime: &str) -> String {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, format).expect("encode fixture image");
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes.into_inner()))
}

pub fn png_data_uri(width: u32, height: u32) -> String {
    let image = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 128]));
    data_uri(DynamicImage::ImageRgb8(image), ImageFormat::Png, "image/png")
}

/// PNG with a transparent background, as produced by a signature pad.
pub fn transparent_png_data_uri(width: u32, height: u32) -> String {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        if x == y {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    data_uri(DynamicImage::ImageRgba8(image), ImageFormat::Png, "image/png")
}

pub fn jpeg_data_uri(width: u32, height: u32) -> String {
    let image = RgbImage::from_fn(width, height, |x, _| Rgb([200, (x % 255) as u8, 40]));
    data_uri(DynamicImage::ImageRgb8(image), ImageFormat::Jpeg, "image/jpeg")
}

/// The worked example: a student with a photo, one ID proof and a signature.
pub fn sample_form() -> FormRecord {
    FormRecord {
        full_name: Some("Asha Rao".to_string()),
        date_of_birth: Some("2004-08-17".to_string()),
        gender: Some("female".to_string()),
        email: Some("asha.rao@example.com".to_string()),
        phone: Some("+91 98450 12345".to_string()),
        address: Some("12 Lake Road, Pune".to_string()),
        guardian_name: Some("Meera Rao".to_string()),
        relation: Some("mother".to_string()),
        guardian_phone: Some("+91 98450 67890".to_string()),
        room_number: Some("B-204".to_string()),
        admission_date: Some("2025-07-01".to_string()),
        stay_duration: Some("12 months".to_string()),
        emergency_contact: Some("+91 98450 11111".to_string()),
        student_photo: Some(jpeg_data_uri(120, 160)),
        id_proofs: Some(vec![png_data_uri(300, 200)]),
        id_proof: None,
        signature: Some(transparent_png_data_uri(200, 80)),
    }
}
