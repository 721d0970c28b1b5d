//! Error translation to the HTTP surface.
//!
//! Every failure leaving a handler becomes a status code plus a
//! `{"detail": string}` body. Pipeline failures carry their own
//! classification; multipart plumbing failures are handler-level 400s.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;
use voxrelay_core::PipelineError;

/// Failure leaving the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A pipeline stage failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The multipart form carried no audio file field.
    #[error("missing audio file field")]
    MissingFile,

    /// The multipart body could not be read.
    #[error("invalid multipart body: {0}")]
    Multipart(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingFile | Self::Multipart(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Pipeline(e) = &self {
            error!(category = e.category(), error = %e, "request failed");
        } else {
            error!(error = %self, "request rejected");
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
