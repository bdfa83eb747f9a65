use actix_web::{web, HttpResponse, Responder};
use chrono::Local;

use super::export::{export_data, export_filename};
use super::models::{
    ApplicationListResponse, ApplicationResponse, BulkUpdateRequest, BulkUpdateResponse, DatabaseStatusResponse,
    ExportRequest, ExportResponse, MessageResponse, StatsResponse, StatusUpdateRequest,
};
use super::{parse_page_id, store_error_response};
use crate::records::database_id::short_id;
use crate::records::ApplicationUpdate;
use crate::{AppState, ErrorResponse};

#[utoipa::path(
    get,
    path = "/api/admin/applications",
    tag = "Admin",
    responses(
        (status = 200, description = "All applications, newest first", body = ApplicationListResponse),
        (status = 503, description = "Notion not configured", body = ErrorResponse)
    )
)]
pub async fn list_applications(state: web::Data<AppState>) -> impl Responder {
    match state.list_applications().await {
        Ok(applications) => HttpResponse::Ok().json(ApplicationListResponse {
            success: true,
            total: applications.len(),
            applications: applications.as_ref().clone(),
        }),
        Err(e) => {
            log::error!("Error fetching applications: {}", e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/applications/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Notion page ID of the application")
    ),
    responses(
        (status = 200, description = "Application found", body = ApplicationResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Application not found", body = ErrorResponse)
    )
)]
pub async fn get_application(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let page_id = match parse_page_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.get_application(&page_id).await {
        Ok(application) => HttpResponse::Ok().json(ApplicationResponse {
            success: true,
            application,
        }),
        Err(e) => {
            log::error!("Error fetching application {}: {}", page_id, e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/admin/applications/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Notion page ID of the application")
    ),
    request_body = ApplicationUpdate,
    responses(
        (status = 200, description = "Application updated", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse)
    )
)]
pub async fn update_application(
    state: web::Data<AppState>,
    path: web::Path<String>,
    item: web::Json<ApplicationUpdate>,
) -> impl Responder {
    let page_id = match parse_page_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.update_application(&page_id, &item).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Application updated successfully")),
        Err(e) => {
            log::error!("Error updating application {}: {}", page_id, e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/admin/applications/{id}/status",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Notion page ID of the application")
    ),
    request_body = StatusUpdateRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Status missing or malformed ID", body = ErrorResponse)
    )
)]
pub async fn update_application_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    item: web::Json<StatusUpdateRequest>,
) -> impl Responder {
    let page_id = match parse_page_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let status = match item.status.as_deref().map(str::trim) {
        Some(status) if !status.is_empty() => status,
        _ => return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Status is required")),
    };

    match state.set_application_status(&page_id, status).await {
        Ok(()) => {
            log::info!("Application {} set to {}", page_id, status);
            HttpResponse::Ok().json(MessageResponse::new(format!("Application status updated to {status}")))
        }
        Err(e) => {
            log::error!("Error updating application status: {}", e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/admin/applications/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "Notion page ID of the application")
    ),
    responses(
        (status = 200, description = "Application archived", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse)
    )
)]
pub async fn delete_application(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let page_id = match parse_page_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.archive_application(&page_id).await {
        Ok(()) => {
            log::info!("Archived application {}", page_id);
            HttpResponse::Ok().json(MessageResponse::new("Application deleted successfully"))
        }
        Err(e) => {
            log::error!("Error deleting application: {}", e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/test-database",
    tag = "Admin",
    responses(
        (status = 200, description = "Active database reachable", body = DatabaseStatusResponse),
        (status = 503, description = "Notion not configured", body = ErrorResponse)
    )
)]
pub async fn test_database(state: web::Data<AppState>) -> impl Responder {
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
            database_id: format!("{}...", short_id(&info.id)),
            database_title: info.title,
            message: "Database connection successful".to_string(),
            actual_id_stored: None,
        }),
        Err(e) => {
            log::error!("Database test failed: {}", e);
            store_error_response(&e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, description = "Application counts per status", body = StatsResponse)
    )
)]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    match state.application_stats().await {
        Ok(stats) => HttpResponse::Ok().json(StatsResponse { success: true, stats }),
        Err(e) => {
            log::error!("Error fetching stats: {}", e);
            store_error_response(&e)
        }
    }
}

/// An empty or `null` body exports everything as CSV.
pub fn parse_export_request(body: &[u8]) -> Result<ExportRequest, String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() || text == "null" {
        return Ok(ExportRequest::default());
    }
    serde_json::from_str(text).map_err(|e| format!("Invalid export request: {e}"))
}

#[utoipa::path(
    post,
    path = "/api/admin/export",
    tag = "Admin",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Export payload with a suggested file name", body = ExportResponse),
        (status = 400, description = "Malformed export request", body = ErrorResponse)
    )
)]
pub async fn export_applications(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let request = match parse_export_request(&body) {
        Ok(request) => request,
        Err(message) => {
            log::warn!("Rejected export request: {}", message);
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
        }
    };

    let applications = match state.applications_with_status(request.status_filter.as_deref()).await {
        Ok(applications) => applications,
        Err(e) => {
            log::error!("Error exporting applications: {}", e);
            return store_error_response(&e);
        }
    };

    match export_data(request.format, &applications) {
        Ok(data) => {
            log::info!("Exported {} applications as {:?}", applications.len(), request.format);
            HttpResponse::Ok().json(ExportResponse {
                success: true,
                data,
                filename: export_filename(request.format, &Local::now()),
                content_type: request.format.content_type().to_string(),
            })
        }
        Err(e) => {
            log::error!("Error rendering export: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::internal_error(&e.to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/bulk-update",
    tag = "Admin",
    request_body = BulkUpdateRequest,
    responses(
        (status = 200, description = "Per-application outcome", body = BulkUpdateResponse),
        (status = 400, description = "IDs or status missing", body = ErrorResponse)
    )
)]
pub async fn bulk_update_status(state: web::Data<AppState>, item: web::Json<BulkUpdateRequest>) -> impl Responder {
    let status = item.status.as_deref().map(str::trim).unwrap_or_default();
    if item.application_ids.is_empty() || status.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request("Application IDs and status are required"));
    }

    match state.bulk_update_status(&item.application_ids, status).await {
        Ok(outcome) => {
            log::info!(
                "Bulk update to {}: {}/{} applications updated",
                status,
                outcome.updated_count,
                outcome.total_count
            );
            HttpResponse::Ok().json(BulkUpdateResponse::from(outcome))
        }
        Err(e) => {
            log::error!("Error in bulk update: {}", e);
            store_error_response(&e)
        }
    }
}

/// Configure admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .service(web::resource("/applications").route(web::get().to(list_applications)))
            .service(
                web::resource("/applications/{id}")
                    .route(web::get().to(get_application))
                    .route(web::put().to(update_application))
                    .route(web::delete().to(delete_application)),
            )
            .service(web::resource("/applications/{id}/status").route(web::patch().to(update_application_status)))
            .service(web::resource("/test-database").route(web::get().to(test_database)))
            .service(web::resource("/stats").route(web::get().to(get_stats)))
            .service(web::resource("/export").route(web::post().to(export_applications)))
            .service(web::resource("/bulk-update").route(web::post().to(bulk_update_status))),
    );
}
