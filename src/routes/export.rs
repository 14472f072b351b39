use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{ErrorResponse, ExportFormat, ExportRequest};
use crate::routes::questions::AppState;
use crate::services::exporter::ExportError;

/// Configure export routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/export", web::post().to(export));
}

/// Export accumulated questions as a downloadable file
///
/// POST /export
///
/// Request body:
/// ```json
/// {
///   "questions": [...],
///   "format": "xlsx|csv|docx"
/// }
/// ```
async fn export(state: web::Data<AppState>, req: web::Json<ExportRequest>) -> impl Responder {
    // Validate request (empty question list -> 400)
    if let Err(errors) = req.validate() {
        tracing::info!("Export validation failed: {}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let format = match req.format.as_deref() {
        None | Some("") => ExportFormat::default(),
        Some(tag) => match ExportFormat::parse(tag) {
            Some(format) => format,
            None => {
                return HttpResponse::BadRequest().json(ErrorResponse::new(
                    "Invalid export format",
                    format!("Format must be one of: xlsx, csv, docx (got \"{}\")", tag),
                    400,
                ));
            }
        },
    };

    tracing::info!(
        "Exporting {} questions as {}",
        req.questions.len(),
        format.extension()
    );

    let path = match state.exporter.export(&req.questions, format) {
        Ok(path) => path,
        Err(e @ ExportError::NoQuestions) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Validation failed",
                e.to_string(),
                400,
            ));
        }
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Export failed",
                e.to_string(),
                500,
            ));
        }
    };

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("questions")
        .to_string();

    // The artifact only lives for the duration of the response
    let bytes = match state.exporter.take(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Failed to read export artifact: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Export failed",
                e.to_string(),
                500,
            ));
        }
    };

    HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(bytes)
}
