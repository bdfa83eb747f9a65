//! Runtime configuration read from the environment (and `.env` when present).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentBranding;

pub const DEFAULT_DATABASE_ID_FILE: &str = "notion_database_id.txt";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must not be zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub integration_secret: String,
    /// A database ID, or the ID of a page to create the database under.
    pub parent_id: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub notion: Option<NotionConfig>,
    pub telegram: Option<TelegramConfig>,
    pub database_id_file: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
    pub branding: DocumentBranding,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notion: None,
            telegram: None,
            database_id_file: PathBuf::from(DEFAULT_DATABASE_ID_FILE),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            branding: DocumentBranding::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let notion = match (var("NOTION_INTEGRATION_SECRET"), var("NOTION_DATABASE_ID")) {
            (Some(integration_secret), Some(parent_id)) => Some(NotionConfig {
                integration_secret,
                parent_id,
            }),
            (secret, parent) => {
                log::warn!(
                    "Notion disabled (secret set: {}, database ID set: {})",
                    secret.is_some(),
                    parent.is_some()
                );
                None
            }
        };

        let telegram = match (var("TELEGRAM_BOT_TOKEN"), var("TELEGRAM_CHAT_ID")) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => {
                log::warn!("Telegram credentials not configured; documents will not be delivered");
                None
            }
        };

        let port = match var("PORT") {
            Some(value) => parse_number::<u16>("PORT", value)?,
            None => defaults.port,
        };
        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(value) => parse_number::<usize>("MAX_BODY_BYTES", value)?,
            None => defaults.max_body_bytes,
        };
        if max_body_bytes == 0 {
            return Err(ConfigError::Zero { name: "MAX_BODY_BYTES" });
        }

        let mut branding = defaults.branding;
        if let Some(name) = var("HOSTEL_NAME") {
            branding.institution_name = name;
        }
        if let Some(email) = var("CONTACT_EMAIL") {
            branding.contact_email = email;
        }

        Ok(Self {
            notion,
            telegram,
            database_id_file: var("DATABASE_ID_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_id_file),
            bind_address: var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            static_dir: var("STATIC_DIR").map(PathBuf::from).unwrap_or(defaults.static_dir),
            max_body_bytes,
            branding,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
