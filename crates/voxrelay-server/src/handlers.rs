//! HTTP handlers.

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use tracing::info;

use crate::error::ApiError;
use crate::health::{self, HealthResponse};
use crate::pipeline::{self, ProcessAudioResponse};
use crate::server::AppState;

/// `POST /process-audio`
///
/// Accepts a multipart form with one audio file and runs the full
/// pipeline. The first field carrying a filename (or named `file`) is
/// treated as the upload; a form without one is a 400.
pub async fn process_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProcessAudioResponse>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let is_file = field.file_name().is_some() || field.name() == Some("file");
        if !is_file {
            continue;
        }

        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;
        info!(media_type = %media_type, bytes = data.len(), "received audio upload");

        let response = pipeline::run(&state, &media_type, &data).await?;
        return Ok((StatusCode::OK, Json(response)));
    }

    Err(ApiError::MissingFile)
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(state.start_time))
}
