//! Router construction and shared state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use voxrelay_llm::GenerationProvider;
use voxrelay_stt::SpeechToText;

use crate::config::Settings;
use crate::handlers;

/// Shared state accessible from handlers.
///
/// Backend clients are constructed once at process start and injected;
/// handlers never build clients per request.
#[derive(Clone)]
pub struct AppState {
    /// Speech-to-text backend.
    pub recognizer: Arc<dyn SpeechToText>,
    /// Generation backend.
    pub generator: Arc<dyn GenerationProvider>,
    /// Root directory for per-request scratch directories.
    pub scratch_root: PathBuf,
    /// When the server started.
    pub start_time: Instant,
}

impl AppState {
    /// Assemble state from settings and the two backend handles.
    #[must_use]
    pub fn new(
        settings: &Settings,
        recognizer: Arc<dyn SpeechToText>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            recognizer,
            generator,
            scratch_root: settings.scratch_dir.clone(),
            start_time: Instant::now(),
        }
    }
}

/// Build the Axum router with all routes and middleware.
///
/// CORS is deliberately permissive; the service sits behind whatever
/// frontend the caller runs.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/process-audio", post(handlers::process_audio))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
