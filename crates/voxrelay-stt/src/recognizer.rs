//! HTTP recognizer client.
//!
//! POSTs the canonical WAV as multipart to the recognizer's `/recognize`
//! endpoint and parses `{"text": string}`. HTTP 422 is the backend's
//! "could not understand the audio" signal; an empty transcript on a 2xx
//! means the same thing.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{SpeechToText, SttError};

/// Response body from the recognizer service.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    text: String,
}

/// Client for a remote speech-to-text HTTP service.
pub struct HttpRecognizer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRecognizer {
    /// Create a client for the recognizer at `base_url` with a bounded
    /// per-request wait.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SttError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SttError::Service {
                message: format!("client build failed: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SpeechToText for HttpRecognizer {
    async fn transcribe(&self, wav_path: &Path) -> Result<String, SttError> {
        let audio_bytes = tokio::fs::read(wav_path).await?;
        debug!(bytes = audio_bytes.len(), "sending audio to recognizer");

        let part = reqwest::multipart::Part::bytes(audio_bytes)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Service {
                message: format!("failed to create multipart: {e}"),
            })?;
        let form = reqwest::multipart::Form::new().part("audio", part);

        let response = self
            .client
            .post(format!("{}/recognize", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| SttError::Service {
                message: format!("recognizer request failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            return Err(SttError::NotUnderstood);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SttError::Service {
                message: format!("recognizer returned {status}: {body}"),
            });
        }

        let parsed: RecognizeResponse =
            response.json().await.map_err(|e| SttError::Service {
                message: format!("failed to parse recognizer response: {e}"),
            })?;

        if parsed.text.trim().is_empty() {
            return Err(SttError::NotUnderstood);
        }
        Ok(parsed.text)
    }
}
