use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use super::database_id::{short_id, DatabaseIdStore};
use super::{DatabaseInfo, PageInfo, RecordStore, StoreError};
use crate::document::ApplicationId;
use crate::form::FormRecord;

/// What the configured Notion ID turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionProbe {
    Database(DatabaseInfo),
    /// A page; the applications database will be created under it.
    Page(PageInfo),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavedApplication {
    pub page_id: String,
    #[schema(value_type = String, example = "HA-20250115143000")]
    pub application_id: ApplicationId,
    pub database_id: String,
}

/// Owns the record store together with the active database ID lifecycle:
/// load and verify at startup, resolve or create on demand, persist on change.
pub struct RecordDirectory {
    store: Arc<dyn RecordStore + Send + Sync>,
    configured_id: String,
    ids: DatabaseIdStore,
    resolving: Mutex<()>,
}

impl RecordDirectory {
    pub fn new(store: Arc<dyn RecordStore + Send + Sync>, configured_id: impl Into<String>, ids: DatabaseIdStore) -> Self {
        Self {
            store,
            configured_id: configured_id.into(),
            ids,
            resolving: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &(dyn RecordStore + Send + Sync) {
        self.store.as_ref()
    }

    pub fn configured_id(&self) -> &str {
        &self.configured_id
    }

    /// The database ID currently in use, if one has been resolved.
    pub fn active_id(&self) -> Option<String> {
        self.ids.current()
    }

    /// Adopt the database ID stored on disk if the store still knows it.
    /// A stale or unreadable file is removed.
    pub async fn load(&self) -> bool {
        let stored = match self.ids.read_file() {
            Ok(Some(id)) => id,
            Ok(None) => {
                log::info!("No stored database ID, will resolve on first use");
                return false;
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", self.ids.path().display(), e);
                self.ids.clear();
                return false;
            }
        };

        match self.store.retrieve_database(&stored).await {
            Ok(_) => {
                self.ids.set(&stored);
                log::info!("Loaded existing database ID: {}...", short_id(&stored));
                true
            }
            Err(e) => {
                log::warn!("Stored database ID {}... is no longer valid: {}", short_id(&stored), e);
                self.ids.clear();
                false
            }
        }
    }

    /// Active database ID. Falls back to the configured ID, creating the
    /// database when the configured ID is a page.
    pub async fn resolve(&self) -> Result<String, StoreError> {
        let _guard = self.resolving.lock().await;

        if let Some(id) = self.ids.current() {
            match self.store.retrieve_database(&id).await {
                Ok(_) => return Ok(id),
                Err(e) => {
                    log::warn!("Active database {}... failed verification: {}", short_id(&id), e);
                    self.ids.clear();
                }
            }
        }

        match self.store.retrieve_database(&self.configured_id).await {
            Ok(_) => {
                self.remember(&self.configured_id);
                Ok(self.configured_id.clone())
            }
            Err(e) if e.is_page_not_database() => {
                log::info!("Creating database in page {}...", short_id(&self.configured_id));
                let database = self
                    .store
                    .create_database(&self.configured_id)
                    .await
                    .map_err(|e| StoreError::DatabaseCreation(Box::new(e)))?;
                self.remember(&database.id);
                Ok(database.id)
            }
            Err(e) => Err(e),
        }
    }

    /// Return the active database if it still exists, otherwise create a new
    /// one under the configured page. The flag is `true` for an existing one.
    pub async fn ensure_database(&self) -> Result<(DatabaseInfo, bool), StoreError> {
        let _guard = self.resolving.lock().await;

        if let Some(id) = self.ids.current() {
            match self.store.retrieve_database(&id).await {
                Ok(info) => return Ok((info, true)),
                Err(e) => {
                    log::warn!("Active database {}... is gone: {}", short_id(&id), e);
                    self.ids.clear();
                }
            }
        }

        let database = self.store.create_database(&self.configured_id).await?;
        self.remember(&database.id);
        Ok((database, false))
    }

    /// Check whether the configured ID points at a database or a page.
    pub async fn probe(&self) -> Result<ConnectionProbe, StoreError> {
        match self.store.retrieve_database(&self.configured_id).await {
            Ok(info) => Ok(ConnectionProbe::Database(info)),
            Err(e) if e.is_page_not_database() => {
                let page = self.store.retrieve_page(&self.configured_id).await?;
                Ok(ConnectionProbe::Page(page))
            }
            Err(e) => Err(e),
        }
    }

    /// Store a submission under a freshly generated application ID.
    pub async fn save_application(&self, form: &FormRecord) -> Result<SavedApplication, StoreError> {
        let application_id = ApplicationId::generate();
        let submitted_at = Local::now().naive_local();
        let database_id = self.resolve().await?;

        let page_id = self
            .store
            .create_application(&database_id, form, &application_id, submitted_at)
            .await?;
        log::info!("Saved application {} as page {}", application_id, page_id);

        Ok(SavedApplication {
            page_id,
            application_id,
            database_id,
        })
    }

    fn remember(&self, id: &str) {
        if let Err(e) = self.ids.persist(id) {
            log::error!("Failed to save database ID to {}: {}", self.ids.path().display(), e);
        }
    }
}
