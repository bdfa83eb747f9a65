use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{MessageReceipt, Messenger, MessengerError};
use crate::config::TelegramConfig;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Deserialize)]
struct BotResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

impl BotResponse {
    fn into_receipt(self) -> Result<MessageReceipt, MessengerError> {
        if self.ok {
            Ok(MessageReceipt {
                message_id: self.result.map(|m| m.message_id),
            })
        } else {
            Err(MessengerError::Rejected(
                self.description.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

/// Telegram Bot API client. Without credentials every send fails with
/// `MessengerError::NotConfigured`.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    config: Option<TelegramConfig>,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, config: Option<TelegramConfig>) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&TelegramConfig, MessengerError> {
        self.config.as_ref().ok_or(MessengerError::NotConfigured)
    }

    fn method_url(config: &TelegramConfig, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API_URL, config.bot_token, method)
    }

    async fn read(response: reqwest::Response) -> Result<MessageReceipt, MessengerError> {
        let status = response.status();
        let body = response.text().await?;
        let parsed: BotResponse = serde_json::from_str(&body)
            .map_err(|e| MessengerError::UnexpectedResponse(format!("{status}: {e}")))?;
        parsed.into_receipt()
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, text: &str) -> Result<MessageReceipt, MessengerError> {
        let config = self.config()?;
        let response = self
            .http
            .post(Self::method_url(config, "sendMessage"))
            .timeout(SEND_TIMEOUT)
            .form(&[
                ("chat_id", config.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await?;
        Self::read(response).await
    }

    async fn send_document(&self, filename: &str, pdf: Vec<u8>, caption: &str) -> Result<MessageReceipt, MessengerError> {
        let config = self.config()?;
        let document = Part::bytes(pdf)
            .file_name(filename.to_string())
            .mime_str("application/pdf")?;
        let form = Form::new()
            .text("chat_id", config.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("document", document);

        let response = self
            .http
            .post(Self::method_url(config, "sendDocument"))
            .timeout(SEND_TIMEOUT)
            .multipart(form)
            .send()
            .await?;
        let receipt = Self::read(response).await?;
        log::info!("Sent {} to Telegram (message {:?})", filename, receipt.message_id);
        Ok(receipt)
    }
}
