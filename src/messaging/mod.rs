//! Messaging module - delivery of submissions to the admissions chat.

pub mod caption;
pub mod telegram;

pub use telegram::TelegramClient;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum MessengerError {
    #[error("Telegram credentials not configured. Please set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID environment variables.")]
    NotConfigured,
    #[error("request to Telegram failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected Telegram response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageReceipt {
    pub message_id: Option<i64>,
}

#[async_trait]
pub trait Messenger {
    /// Send an HTML-formatted text message.
    async fn send_message(&self, text: &str) -> Result<MessageReceipt, MessengerError>;

    /// Send a PDF with an HTML caption.
    async fn send_document(&self, filename: &str, pdf: Vec<u8>, caption: &str) -> Result<MessageReceipt, MessengerError>;
}
