//! Admin module - review, edit and export stored applications.
//!
//! - `handlers` - `/api/admin` endpoints
//! - `database` - Notion connection and database setup endpoints
//! - `export` - CSV and JSON exports

pub mod database;
pub mod export;
pub mod handlers;
pub mod models;

use actix_web::HttpResponse;

use crate::records::{normalize_page_id, StoreError};
use crate::ErrorResponse;

/// Map a record store failure onto an HTTP response.
pub fn store_error_response(e: &StoreError) -> HttpResponse {
    match e {
        StoreError::NotConfigured => {
            HttpResponse::ServiceUnavailable().json(ErrorResponse::service_unavailable(&e.to_string()))
        }
        e if e.is_not_found() => HttpResponse::NotFound().json(ErrorResponse::not_found(&e.to_string())),
        e => HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string())),
    }
}

/// Notion page IDs are UUIDs, with or without hyphens.
pub fn parse_page_id(raw: &str) -> Result<String, HttpResponse> {
    normalize_page_id(raw)
        .ok_or_else(|| HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("Invalid application ID: {raw}"))))
}
