use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod dictionary;
mod error;
mod extract;
mod ocr;
mod output;
mod pages;
mod tts;

use api::routes::{create_router, AppState};
use config::Config;
use dictionary::Dictionary;
use extract::LopdfExtractor;
use ocr::TesseractCli;
use output::OutputStore;
use tts::{GoogleTts, TtsService};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => fail_startup("Invalid configuration", &e),
    };

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => fail_startup("Invalid address", &e),
    };

    tracing::info!("OMERIKI server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Dictionary: {}", config.dictionary_path.display());
    tracing::info!("Static directory: {}", config.static_dir.display());
    tracing::info!("Output directory: {}", config.output_dir.display());

    let dictionary = match Dictionary::load(&config.dictionary_path) {
        Ok(dictionary) => dictionary,
        Err(e) => fail_startup("Failed to load dictionary", &e),
    };
    if dictionary.is_empty() {
        tracing::warn!("Dictionary is empty, every lookup will miss");
    } else {
        tracing::info!("Loaded {} dictionary entries", dictionary.len());
    }

    let audio_store = match OutputStore::create(&config.output_dir) {
        Ok(store) => store,
        Err(e) => fail_startup("Failed to create output directory", &e),
    };

    let synthesizer = match GoogleTts::new(&config.tts_endpoint, &config.tts_language, config.tts_timeout) {
        Ok(synthesizer) => synthesizer,
        Err(e) => fail_startup("Failed to create speech synthesizer", &e),
    };

    if let Some(max_age) = config.audio_retention {
        tracing::info!(
            "Generated audio expires after {}s (sweep every {}s)",
            max_age.as_secs(),
            config.sweep_interval.as_secs()
        );
        tokio::spawn(output::run_sweeper(audio_store.clone(), max_age, config.sweep_interval));
    }

    // Create app state
    let state = Arc::new(AppState {
        dictionary,
        tts: TtsService::new(Arc::new(synthesizer), audio_store),
        extractor: Arc::new(LopdfExtractor),
        recognizer: Arc::new(TesseractCli::new(config.tesseract_bin.clone())),
        ocr_language: config.ocr_language.clone(),
        static_dir: config.static_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    });

    // Create router
    let app = create_router(state);

    tracing::info!("Starting server on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => fail_startup("Failed to bind to address", &e),
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

fn fail_startup(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!("{}: {}", context, error);
    std::process::exit(1);
}
