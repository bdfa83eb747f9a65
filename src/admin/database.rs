//! Notion connection checks and database setup.

use actix_web::{web, HttpResponse, Responder};

use super::models::{ConnectionTestResponse, CreateDatabaseResponse, DatabaseStatusResponse};
use super::store_error_response;
use crate::records::database_id::short_id;
use crate::records::ConnectionProbe;
use crate::{AppState, ErrorResponse};

fn shortened(id: &str) -> String {
    format!("{}...", short_id(id))
}

#[utoipa::path(
    get,
    path = "/notion-test",
    tag = "Notion",
    responses(
        (status = 200, description = "Configured ID is a database or a page", body = ConnectionTestResponse),
        (status = 500, description = "Notion rejected the request", body = ErrorResponse),
        (status = 503, description = "Notion not configured", body = ErrorResponse)
    )
)]
pub async fn notion_test(state: web::Data<AppState>) -> impl Responder {
    let records = match state.records() {
        Ok(records) => records,
        Err(e) => return store_error_response(&e),
    };

    match records.probe().await {
        Ok(ConnectionProbe::Database(info)) => HttpResponse::Ok().json(ConnectionTestResponse {
            success: true,
            kind: "database".to_string(),
            database_id: Some(shortened(&info.id)),
            database_title: Some(info.title),
            page_id: None,
            page_title: None,
            message: "Notion database connection successful!".to_string(),
            note: None,
        }),
        Ok(ConnectionProbe::Page(page)) => HttpResponse::Ok().json(ConnectionTestResponse {
            success: true,
            kind: "page".to_string(),
            database_id: None,
            database_title: None,
            page_id: Some(shortened(&page.id)),
            page_title: Some(page.title),
            message: "Notion page found! Database will be created automatically when first form is submitted."
                .to_string(),
            note: Some("This is a page, not a database. The system will create a database automatically.".to_string()),
        }),
        Err(e) => {
            log::error!("Notion connection test failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Notion connection failed: {e}")))
        }
    }
}

#[utoipa::path(
    post,
    path = "/create-notion-database",
    tag = "Notion",
    responses(
        (status = 200, description = "Active database, created if it did not exist", body = CreateDatabaseResponse),
        (status = 503, description = "Notion not configured", body = ErrorResponse)
    )
)]
pub async fn create_notion_database(state: web::Data<AppState>) -> impl Responder {
    let records = match state.records() {
        Ok(records) => records,
        Err(e) => return store_error_response(&e),
    };

    match records.ensure_database().await {
        Ok((info, existing)) => {
            if existing {
                log::info!("Database {}... already exists", short_id(&info.id));
            } else {
                log::info!("Created database {}...", short_id(&info.id));
                state.invalidate_applications().await;
            }
            HttpResponse::Ok().json(CreateDatabaseResponse {
                success: true,
                message: if existing {
                    "Database already exists!".to_string()
                } else {
                    "Database created successfully!".to_string()
                },
                database_id: info.id,
                database_title: info.title,
                existing,
            })
        }
        Err(e) => {
            log::error!("Error creating database: {}", e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/get-database-info",
    tag = "Notion",
    responses(
        (status = 200, description = "Active database details", body = DatabaseStatusResponse),
        (status = 503, description = "Notion not configured", body = ErrorResponse)
    )
)]
pub async fn get_database_info(state: web::Data<AppState>) -> impl Responder {
    let records = match state.records() {
        Ok(records) => records,
        Err(e) => return store_error_response(&e),
    };

    let info = match records.resolve().await {
        Ok(database_id) => records.store().retrieve_database(&database_id).await,
        Err(e) => Err(e),
    };

    match info {
        Ok(info) => HttpResponse::Ok().json(DatabaseStatusResponse {
            success: true,
            database_id: shortened(&info.id),
            database_title: info.title,
            message: "Database is ready for submissions!".to_string(),
            actual_id_stored: Some(records.active_id().is_some()),
        }),
        Err(e) => {
            log::error!("Error resolving database: {}", e);
            store_error_response(&e)
        }
    }
}

/// Configure Notion setup routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/notion-test").route(web::get().to(notion_test)))
        .service(web::resource("/create-notion-database").route(web::post().to(create_notion_database)))
        .service(web::resource("/get-database-info").route(web::get().to(get_database_info)));
}
