//! Application state shared by every handler.
//!
//! - `applications` - cached read model and writes over the record store

mod applications;

pub use applications::{ApplicationStats, BulkUpdateOutcome, APPLICATIONS_CACHE_KEY};

use anyhow::Context;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::document::DocumentBuilder;
use crate::messaging::{Messenger, TelegramClient};
use crate::records::{ApplicationRecord, DatabaseIdStore, NotionClient, RecordDirectory, StoreError};

pub const APPLICATIONS_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when Notion is not configured.
    pub records: Option<Arc<RecordDirectory>>,
    pub messenger: Arc<dyn Messenger + Send + Sync>,
    pub documents: DocumentBuilder,
    pub application_cache: Cache<String, Arc<Vec<ApplicationRecord>>>,
}

impl AppState {
    pub async fn new_with_config(config: AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(900))
            .user_agent(concat!("hostel-admission-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create HTTP client")?;

        let records = match &config.notion {
            Some(notion) => {
                let store = Arc::new(NotionClient::new(http_client.clone(), notion.integration_secret.clone()));
                let directory = RecordDirectory::new(
                    store,
                    notion.parent_id.clone(),
                    DatabaseIdStore::new(config.database_id_file.clone()),
                );
                log::info!("Notion client initialized");
                directory.load().await;
                Some(Arc::new(directory))
            }
            None => {
                log::warn!("Notion integration secret not found, submissions will not be stored");
                None
            }
        };

        let messenger = Arc::new(TelegramClient::new(http_client, config.telegram.clone()));

        Ok(Self::new_with_services(config, records, messenger))
    }

    /// Assemble state from already constructed services.
    pub fn new_with_services(
        config: AppConfig,
        records: Option<Arc<RecordDirectory>>,
        messenger: Arc<dyn Messenger + Send + Sync>,
    ) -> Self {
        let application_cache = Cache::builder()
            .time_to_live(APPLICATIONS_CACHE_TTL)
            .max_capacity(16)
            .build();

        AppState {
            documents: DocumentBuilder::new(config.branding.clone()),
            config: Arc::new(config),
            records,
            messenger,
            application_cache,
        }
    }

    /// The record directory, or `StoreError::NotConfigured`.
    pub fn records(&self) -> Result<&RecordDirectory, StoreError> {
        self.records.as_deref().ok_or(StoreError::NotConfigured)
    }
}
