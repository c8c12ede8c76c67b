use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::extract::ExtractionError;
use crate::ocr::RecognitionError;
use crate::tts::SynthesisError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Word not found: {0}")]
    WordNotFound(String),

    #[error("No text found in the uploaded image")]
    NoTextFound,

    #[error("Error generating audio: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Error processing PDF: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Error processing image: {0}")]
    Recognition(#[from] RecognitionError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::WordNotFound(_) => (
                StatusCode::NOT_FOUND,
                "WORD_NOT_FOUND",
                "Word not found in the dictionary.".to_string(),
            ),
            AppError::NoTextFound => (
                StatusCode::NOT_FOUND,
                "NO_TEXT_FOUND",
                "No text found in the uploaded image.".to_string(),
            ),
            AppError::Synthesis(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TTS_ERROR",
                self.to_string(),
            ),
            AppError::Extraction(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PDF_ERROR",
                self.to_string(),
            ),
            AppError::Recognition(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OCR_ERROR",
                self.to_string(),
            ),
        };

        tracing::error!("Request failed: {} - {}", code, message);

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
