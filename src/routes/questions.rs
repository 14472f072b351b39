use actix_multipart::{Multipart, MultipartError};
use actix_web::{web, HttpResponse, Responder};
use futures_util::TryStreamExt;
use std::sync::Arc;

use crate::models::{
    Difficulty, ErrorResponse, GenerationForm, GenerationParams, HealthResponse, QuestionType,
};
use crate::services::{extract_text, Exporter, FileIntake, QuestionGenerator};

/// Batch size cap to prevent excessive LLM calls
const MAX_BATCH_SIZE: usize = 50;
const DEFAULT_BATCH_SIZE: usize = 5;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<QuestionGenerator>,
    pub intake: Arc<FileIntake>,
    pub exporter: Arc<Exporter>,
}

/// Configure generation-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/generate-single", web::post().to(generate_single))
        .route("/generate-batch", web::post().to(generate_batch));
}

/// Landing page
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Generate a single question
///
/// POST /generate-single
///
/// Multipart form fields: `subject`, `topic`, `questionType`, `difficulty`,
/// `context`, plus an optional `referenceFile` upload.
async fn generate_single(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    let form = match collect_form(payload).await {
        Ok(form) => form,
        Err(e) => return bad_multipart(e),
    };

    let question_type = match parse_question_type(&form.question_type) {
        Ok(t) => t,
        Err(response) => return response,
    };
    let difficulty = match parse_difficulty(&form.difficulty) {
        Ok(d) => d,
        Err(response) => return response,
    };

    let reference_text = match resolve_reference(&state, form.reference_file) {
        Ok(text) => text,
        Err(response) => return response,
    };

    let params = GenerationParams {
        subject: form.subject,
        topic: form.topic,
        difficulty,
        context: form.context,
        reference_text,
    };

    tracing::info!(
        "Generating single {} question: {}/{}",
        question_type.label(),
        params.subject,
        params.topic
    );

    match state.generator.generate_single(&params, question_type).await {
        Ok(question) => HttpResponse::Ok().json(question),
        Err(e) => {
            tracing::error!("Question generation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Question generation failed",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Generate a batch of questions
///
/// POST /generate-batch
///
/// Form fields as for `/generate-single`, plus `numQuestions` and repeated
/// `questionTypes` entries. Returns exactly `numQuestions` records, cycling
/// across the requested types.
async fn generate_batch(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    let form = match collect_form(payload).await {
        Ok(form) => form,
        Err(e) => return bad_multipart(e),
    };

    let mut question_types = Vec::with_capacity(form.question_types.len());
    for raw in &form.question_types {
        match parse_question_type(raw) {
            Ok(t) => question_types.push(t),
            Err(response) => return response,
        }
    }
    let difficulty = match parse_difficulty(&form.difficulty) {
        Ok(d) => d,
        Err(response) => return response,
    };

    let count = form
        .num_questions
        .unwrap_or(DEFAULT_BATCH_SIZE)
        .min(MAX_BATCH_SIZE);

    let reference_text = match resolve_reference(&state, form.reference_file) {
        Ok(text) => text,
        Err(response) => return response,
    };

    let params = GenerationParams {
        subject: form.subject,
        topic: form.topic,
        difficulty,
        context: form.context,
        reference_text,
    };

    tracing::info!(
        "Generating batch of {} questions: {}/{}",
        count,
        params.subject,
        params.topic
    );

    match state
        .generator
        .generate_batch(&params, count, &question_types)
        .await
    {
        Ok(questions) => HttpResponse::Ok().json(questions),
        Err(e) => {
            tracing::error!("Batch generation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Batch generation failed",
                e.to_string(),
                500,
            ))
        }
    }
}

/// Collect multipart fields into a [`GenerationForm`]
async fn collect_form(mut payload: Multipart) -> Result<GenerationForm, MultipartError> {
    let mut form = GenerationForm::default();

    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(|f| f.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        if name == "referenceFile" {
            // An empty filename means the file input was left blank
            if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                form.reference_file = Some((filename, data));
            }
            continue;
        }

        let value = String::from_utf8_lossy(&data).trim().to_string();
        match name.as_str() {
            "subject" => form.subject = value,
            "topic" => form.topic = value,
            "questionType" => form.question_type = value,
            "questionTypes" => form.question_types.push(value),
            "difficulty" => form.difficulty = value,
            "context" => form.context = value,
            "numQuestions" => form.num_questions = value.parse().ok(),
            _ => tracing::debug!("Ignoring unknown form field: {}", name),
        }
    }

    Ok(form)
}

/// Store the upload and extract its text.
///
/// Files with a disallowed extension are skipped silently (warn log only)
/// and the reference text stays empty; storage or extraction failures on an
/// accepted file abort the request.
fn resolve_reference(
    state: &AppState,
    upload: Option<(String, Vec<u8>)>,
) -> Result<String, HttpResponse> {
    let Some((filename, data)) = upload else {
        return Ok(String::new());
    };

    if !FileIntake::allowed_file(&filename) {
        tracing::warn!("Skipping upload with disallowed extension: {}", filename);
        return Ok(String::new());
    }

    let path = state.intake.store(&filename, &data).map_err(|e| {
        tracing::error!("Failed to store upload {}: {}", filename, e);
        HttpResponse::InternalServerError().json(ErrorResponse::new(
            "Failed to store upload",
            e.to_string(),
            500,
        ))
    })?;

    let text = extract_text(&path);
    state.intake.finish(&path);

    text.map_err(|e| {
        tracing::error!("Failed to extract reference text from {}: {}", filename, e);
        HttpResponse::InternalServerError().json(ErrorResponse::new(
            "Failed to extract reference text",
            e.to_string(),
            500,
        ))
    })
}

fn parse_question_type(raw: &str) -> Result<QuestionType, HttpResponse> {
    if raw.is_empty() {
        return Ok(QuestionType::default());
    }
    QuestionType::parse(raw).ok_or_else(|| {
        HttpResponse::BadRequest().json(ErrorResponse::new(
            "Invalid question type",
            format!(
                "Question type must be one of: multiple-choice, fill-in-blank, true-false, short-answer, essay (got \"{}\")",
                raw
            ),
            400,
        ))
    })
}

fn parse_difficulty(raw: &str) -> Result<Difficulty, HttpResponse> {
    if raw.is_empty() {
        return Ok(Difficulty::default());
    }
    Difficulty::parse(raw).ok_or_else(|| {
        HttpResponse::BadRequest().json(ErrorResponse::new(
            "Invalid difficulty",
            format!("Difficulty must be one of: easy, medium, hard (got \"{}\")", raw),
            400,
        ))
    })
}

fn bad_multipart(e: MultipartError) -> HttpResponse {
    tracing::info!("Malformed multipart request: {}", e);
    HttpResponse::BadRequest().json(ErrorResponse::new(
        "Invalid multipart form",
        e.to_string(),
        400,
    ))
}
