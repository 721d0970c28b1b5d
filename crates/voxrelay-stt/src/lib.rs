//! Speech-to-text backend client.
//!
//! The recognizer is an external HTTP service: canonical WAV in, plain
//! recognized text out. The one subtlety is failure discrimination — the
//! backend signalling "no speech understood" must surface differently from
//! the backend being unreachable, and the pipeline maps the two to
//! different HTTP statuses.

#![deny(unsafe_code)]

mod recognizer;

pub use recognizer::HttpRecognizer;

use std::path::Path;

use async_trait::async_trait;

/// Errors from the speech-to-text backend.
#[derive(Debug, thiserror::Error)]
pub enum SttError {
    /// The backend parsed the audio but found no intelligible speech.
    #[error("speech not understood")]
    NotUnderstood,

    /// The backend is unreachable, timed out, or returned a protocol error.
    #[error("recognizer service error: {message}")]
    Service {
        /// Description of the failure.
        message: String,
    },

    /// Reading the canonical audio file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech-to-text backend.
///
/// Implementors must be `Send + Sync` so a single client handle constructed
/// at startup can be shared across request tasks.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the canonical WAV file at `wav_path` to text.
    async fn transcribe(&self, wav_path: &Path) -> Result<String, SttError>;
}
