use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::properties::{self, create_database_body, query_body};
use super::{ApplicationRecord, ApplicationUpdate, DatabaseInfo, PageInfo, RecordStore, StoreError};
use crate::document::ApplicationId;
use crate::form::FormRecord;

pub const NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion REST client for the applications database.
#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    secret: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, secret: impl Into<String>) -> Self {
        Self {
            http,
            secret: secret.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{NOTION_API_URL}{path}"))
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ApiErrorBody>(&body).unwrap_or(ApiErrorBody {
            code: String::new(),
            message: body,
        });
        log::debug!("Notion returned {}: {} {}", status, error.code, error.message);
        Err(StoreError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        })
    }
}

fn object_id(value: &Value) -> Result<String, StoreError> {
    value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::UnexpectedResponse("object without an id".to_string()))
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseInfo, StoreError> {
        let database = self
            .send(self.request(Method::GET, &format!("/databases/{database_id}")))
            .await?;
        Ok(DatabaseInfo {
            id: object_id(&database)?,
            title: properties::database_title(&database),
        })
    }

    async fn create_database(&self, parent_page_id: &str) -> Result<DatabaseInfo, StoreError> {
        let database = self
            .send(
                self.request(Method::POST, "/databases")
                    .json(&create_database_body(parent_page_id)),
            )
            .await?;
        let id = object_id(&database)?;
        log::info!("Created Notion database {}", id);
        Ok(DatabaseInfo {
            id,
            title: properties::database_title(&database),
        })
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<PageInfo, StoreError> {
        let page = self
            .send(self.request(Method::GET, &format!("/pages/{page_id}")))
            .await?;
        Ok(PageInfo {
            id: object_id(&page)?,
            title: properties::page_title(&page),
        })
    }

    async fn create_application(
        &self,
        database_id: &str,
        form: &FormRecord,
        application_id: &ApplicationId,
        submitted_at: NaiveDateTime,
    ) -> Result<String, StoreError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties::form_properties(form, application_id, submitted_at),
        });
        let page = self.send(self.request(Method::POST, "/pages").json(&body)).await?;
        object_id(&page)
    }

    async fn query_applications(
        &self,
        database_id: &str,
        status: Option<&str>,
    ) -> Result<Vec<ApplicationRecord>, StoreError> {
        let path = format!("/databases/{database_id}/query");
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = query_body(status, cursor.as_deref());
            let value = self.send(self.request(Method::POST, &path).json(&body)).await?;
            let page: QueryResponse = serde_json::from_value(value)
                .map_err(|e| StoreError::UnexpectedResponse(e.to_string()))?;

            for result in &page.results {
                match properties::record_from_page(result) {
                    Some(record) => records.push(record),
                    None => log::warn!("Skipping query result without an id"),
                }
            }

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        log::debug!("Fetched {} applications from {}", records.len(), database_id);
        Ok(records)
    }

    async fn get_application(&self, page_id: &str) -> Result<ApplicationRecord, StoreError> {
        let page = self
            .send(self.request(Method::GET, &format!("/pages/{page_id}")))
            .await?;
        properties::record_from_page(&page)
            .ok_or_else(|| StoreError::UnexpectedResponse("page without an id".to_string()))
    }

    async fn update_application(&self, page_id: &str, update: &ApplicationUpdate) -> Result<(), StoreError> {
        let body = json!({ "properties": properties::update_properties(update) });
        self.send(
            self.request(Method::PATCH, &format!("/pages/{page_id}"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn archive_application(&self, page_id: &str) -> Result<(), StoreError> {
        self.send(
            self.request(Method::PATCH, &format!("/pages/{page_id}"))
                .json(&json!({ "archived": true })),
        )
        .await?;
        Ok(())
    }
}
