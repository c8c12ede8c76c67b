use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    response::Html,
    Json,
};
use std::sync::Arc;

use super::{HealthResponse, TtsQuery, TtsResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::extract::ExtractionError;
use crate::pages;

const UPLOAD_FIELD: &str = "file";

pub async fn index() -> Html<&'static str> {
    Html(pages::index())
}

pub async fn dictionary_lookup(
    State(state): State<Arc<AppState>>,
    Path(word): Path<String>,
) -> Result<Html<String>, AppError> {
    let entry = state
        .dictionary
        .lookup(&word)
        .ok_or_else(|| AppError::WordNotFound(word.clone()))?;

    Ok(Html(pages::dictionary_entry(entry)))
}

pub async fn text_to_speech(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TtsQuery>, QueryRejection>,
) -> Result<Json<TtsResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let response = synthesize_to_store(&state, &query.text, query.slow).await?;
    Ok(Json(response))
}

pub async fn pdf_to_speech(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TtsResponse>, AppError> {
    let pdf = read_upload(multipart).await?;
    tracing::debug!("Extracting text from {} byte PDF", pdf.len());

    let extractor = Arc::clone(&state.extractor);
    let text = tokio::task::spawn_blocking(move || extractor.extract_text(&pdf))
        .await
        .map_err(|e| ExtractionError(format!("Extraction task failed: {}", e)))??;

    let response = synthesize_to_store(&state, &text, false).await?;
    Ok(Json(response))
}

pub async fn handwritten_to_speech(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TtsResponse>, AppError> {
    let image = read_upload(multipart).await?;
    tracing::debug!("Recognizing text in {} byte image", image.len());

    let text = state
        .recognizer
        .recognize(&image, &state.ocr_language)
        .await?;

    if text.trim().is_empty() {
        return Err(AppError::NoTextFound);
    }

    let response = synthesize_to_store(&state, &text, false).await?;
    Ok(Json(response))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Shared by every endpoint that ends in speech.
async fn synthesize_to_store(
    state: &AppState,
    text: &str,
    slow: bool,
) -> Result<TtsResponse, AppError> {
    if text.is_empty() {
        return Err(AppError::BadRequest("Text cannot be empty.".into()));
    }

    let generated = state.tts.speak(text, slow).await?;

    Ok(TtsResponse {
        message: "Audio file generated successfully!".to_string(),
        download_link: format!("/static/{}", generated.filename),
        filename: generated.filename,
    })
}

/// Bytes of the `file` field. Missing, empty, or unreadable uploads are bad
/// requests; uploads over the body limit are rejected as too large.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>, AppError> {
    let no_file = || AppError::BadRequest("No file uploaded.".into());

    let mut multipart = multipart.map_err(|_| no_file())?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;

        if bytes.is_empty() {
            return Err(no_file());
        }
        return Ok(bytes.to_vec());
    }

    Err(no_file())
}

fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", e.body_text()))
    } else {
        AppError::BadRequest(format!("Invalid upload: {}", e.body_text()))
    }
}
