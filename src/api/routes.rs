use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::dictionary::Dictionary;
use crate::extract::DocumentExtractor;
use crate::ocr::ImageRecognizer;
use crate::tts::TtsService;

pub struct AppState {
    pub dictionary: Dictionary,
    pub tts: TtsService,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub recognizer: Arc<dyn ImageRecognizer>,
    pub ocr_language: String,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // Generated audio is served next to the static assets so download links resolve.
    let static_files =
        ServeDir::new(&state.static_dir).fallback(ServeDir::new(state.tts.output().dir()));

    let api_routes = Router::new().route("/health", get(handlers::health));

    Router::new()
        .route("/", get(handlers::index))
        .route("/dict/:word", get(handlers::dictionary_lookup))
        .route("/tts", post(handlers::text_to_speech))
        .route("/pdf", post(handlers::pdf_to_speech))
        .route("/handwritten", post(handlers::handwritten_to_speech))
        .nest("/api", api_routes)
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
