//! Generation backend client.
//!
//! One provider: the Google Gemini `generateContent` API in API-key mode.
//! The pipeline only needs "prompt string in, generated text out", so the
//! trait seam is deliberately that narrow — stubs in tests implement it
//! with a lookup table.

#![deny(unsafe_code)]

pub mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::{DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;

/// Errors from the generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// HTTP transport failure (connect, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description from the response body.
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered successfully but produced no text.
    #[error("generation backend returned no text")]
    EmptyResponse,
}

/// Text generation backend.
///
/// Implementors must be `Send + Sync` so a single client handle constructed
/// at startup can be shared across request tasks.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a reply for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
