use actix_web::{web, HttpResponse, Responder};
use chrono::Local;
use serde_json::Value;

use super::models::{SubmissionFailure, SubmissionResponse, SUBMITTED_MESSAGE};
use crate::document::common::document_filename;
use crate::document::{ApplicationId, GeneratedDocument};
use crate::form::FormRecord;
use crate::messaging::caption::{application_caption, build_failure_message};
use crate::records::{SavedApplication, StoreError};
use crate::{AppState, ErrorResponse};

/// Parse the request body into a form. Absent, `null` and `{}` bodies are
/// rejected.
pub fn parse_form(body: &[u8]) -> Result<FormRecord, String> {
    const NO_DATA: &str = "No data provided";

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(NO_DATA.to_string());
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?;
    match &value {
        Value::Null => return Err(NO_DATA.to_string()),
        Value::Object(fields) if fields.is_empty() => return Err(NO_DATA.to_string()),
        Value::Object(_) => {}
        _ => return Err("Expected a JSON object".to_string()),
    }
    serde_json::from_value(value).map_err(|e| format!("Invalid form data: {e}"))
}

async fn save_record(state: &AppState, form: &FormRecord) -> Result<SavedApplication, StoreError> {
    let saved = state.records()?.save_application(form).await?;
    state.invalidate_applications().await;
    Ok(saved)
}

async fn build_document(state: &AppState, form: FormRecord) -> Result<GeneratedDocument, String> {
    let builder = state.documents.clone();
    web::block(move || builder.build(&form))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

#[utoipa::path(
    post,
    path = "/submit-application",
    tag = "Submission",
    request_body = FormRecord,
    responses(
        (status = 200, description = "Stored and/or delivered; warnings report the side that failed", body = SubmissionResponse),
        (status = 400, description = "Empty or malformed body", body = ErrorResponse),
        (status = 500, description = "PDF could not be built, or neither Notion nor Telegram accepted it", body = SubmissionFailure)
    )
)]
pub async fn submit_application(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let form = match parse_form(&body) {
        Ok(form) => form,
        Err(message) => return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message)),
    };
    log::info!(
        "Received application from {}",
        FormRecord::text_or_na(&form.full_name)
    );

    let saved = save_record(&state, &form).await;
    let notion_error = match &saved {
        Ok(saved) => {
            log::info!("Application {} stored as page {}", saved.application_id, saved.page_id);
            None
        }
        Err(e) => {
            log::warn!("Notion save failed: {}", e);
            Some(e.to_string())
        }
    };
    let saved = saved.ok();

    let document = match build_document(&state, form.clone()).await {
        Ok(document) => document,
        Err(error) => {
            log::error!("Failed to generate PDF: {}", error);
            let application_id = saved
                .as_ref()
                .map(|s| s.application_id.to_string())
                .unwrap_or_else(|| ApplicationId::generate().to_string());
            let notice = build_failure_message(&form, &application_id, &error);
            if let Err(e) = state.messenger.send_message(&notice).await {
                log::error!("Failed to send PDF failure notice: {}", e);
            }
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("Failed to generate PDF: {error}")));
        }
    };

    let application_id = saved
        .as_ref()
        .map(|s| s.application_id.to_string())
        .unwrap_or_else(|| document.application_id.to_string());
    let filename = document_filename(
        &state.documents.branding().file_prefix(),
        FormRecord::text(&form.full_name),
        &Local::now(),
    );
    let caption = application_caption(&form, &application_id);

    let sent = state.messenger.send_document(&filename, document.pdf, &caption).await;
    let telegram_error = match &sent {
        Ok(_) => None,
        Err(e) => {
            log::warn!("Telegram send failed: {}", e);
            Some(e.to_string())
        }
    };

    if let (Some(notion_error), Some(telegram_error)) = (&notion_error, &telegram_error) {
        log::error!("Application {} was neither stored nor delivered", application_id);
        return HttpResponse::InternalServerError().json(SubmissionFailure {
            success: false,
            error: "Failed to submit to both Notion and Telegram".to_string(),
            notion_error: notion_error.clone(),
            telegram_error: telegram_error.clone(),
            document_application_id: document.application_id.to_string(),
        });
    }

    HttpResponse::Ok().json(SubmissionResponse {
        success: true,
        message: SUBMITTED_MESSAGE.to_string(),
        application_id,
        document_application_id: document.application_id.to_string(),
        notion_page_id: saved.map(|s| s.page_id),
        telegram_message_id: sent.ok().and_then(|receipt| receipt.message_id),
        pdf_pages: document.pages.len(),
        skipped_pages: document.skipped,
        notion_warning: notion_error.map(|e| format!("Notion save failed: {e}")),
        telegram_warning: telegram_error.map(|e| format!("Telegram send failed: {e}")),
    })
}

/// Configure submission routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/submit-application").route(web::post().to(submit_application)));
}
