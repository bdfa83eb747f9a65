use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::middleware::Compress;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod admin;
pub mod config;
pub mod db;
pub mod document;
pub mod form;
pub mod messaging;
pub mod records;
pub mod submission;

pub use crate::config::AppConfig;
pub use crate::db::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_type: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            success: false,
            error: message.to_string(),
            error_type: error_type.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self::new("ServiceUnavailable", message)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub notion_configured: bool,
    pub telegram_configured: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        success: true,
        status: "ok".to_string(),
        notion_configured: state.records.is_some(),
        telegram_configured: state.config.telegram.is_some(),
    })
}

async fn index_page(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(state.config.static_dir.join("index.html"))?)
}

async fn admin_page(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(state.config.static_dir.join("admin.html"))?)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health,
        crate::submission::handlers::submit_application,
        crate::admin::handlers::list_applications,
        crate::admin::handlers::get_application,
        crate::admin::handlers::update_application,
        crate::admin::handlers::update_application_status,
        crate::admin::handlers::delete_application,
        crate::admin::handlers::test_database,
        crate::admin::handlers::get_stats,
        crate::admin::handlers::export_applications,
        crate::admin::handlers::bulk_update_status,
        crate::admin::database::notion_test,
        crate::admin::database::create_notion_database,
        crate::admin::database::get_database_info
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            form::FormRecord,
            document::AttachmentKind,
            document::SkippedPage,
            submission::models::SubmissionResponse,
            submission::models::SubmissionFailure,
            records::ApplicationRecord,
            records::ApplicationUpdate,
            db::ApplicationStats,
            admin::export::ExportFormat,
            admin::models::StatusUpdateRequest,
            admin::models::ExportRequest,
            admin::models::BulkUpdateRequest,
            admin::models::ApplicationListResponse,
            admin::models::ApplicationResponse,
            admin::models::MessageResponse,
            admin::models::StatsResponse,
            admin::models::ExportResponse,
            admin::models::BulkUpdateResponse,
            admin::models::DatabaseStatusResponse,
            admin::models::ConnectionTestResponse,
            admin::models::CreateDatabaseResponse,
        )
    ),
    tags(
        (name = "Submission", description = "Admission form submission."),
        (name = "Admin", description = "Application review and export endpoints."),
        (name = "Notion", description = "Notion connection and database setup."),
        (name = "Health", description = "Liveness probe.")
    )
)]
pub struct ApiDoc;

/// Register every JSON endpoint. Static pages, metrics and Swagger UI are
/// added by `run`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .configure(submission::config)
        .configure(admin::database::config)
        .configure(admin::handlers::config);
}

/// Request body limits for JSON and raw payload extractors.
pub fn body_limits(max_body_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::PayloadConfig::new(max_body_bytes))
            .app_data(web::JsonConfig::default().limit(max_body_bytes));
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind = (config.bind_address.clone(), config.port);
    let static_dir = config.static_dir.clone();
    let max_body_bytes = config.max_body_bytes;

    let app_state = web::Data::new(
        AppState::new_with_config(config)
            .await
            .context("failed to initialize application state")?,
    );

    let prometheus = PrometheusMetricsBuilder::new("hostel_admission_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {e}"))?;

    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(body_limits(max_body_bytes))
            .configure(configure_api)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()))
            .service(web::resource("/").route(web::get().to(index_page)))
            .service(web::resource("/admin").route(web::get().to(admin_page)))
            .service(Files::new("/static", static_dir.clone()))
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind)
    .context("failed to bind server address")?
    .run()
    .await
    .context("server terminated with an error")
}
