//! Google Gemini `generateContent` client (API-key mode).
//!
//! URL shape: `{base}/models/{model}:generateContent?key={api_key}`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::types::{GenerateContentRequest, GenerateContentResponse};
use crate::{DEFAULT_BASE_URL, DEFAULT_MODEL, GenerationError, GenerationProvider};

/// Client for the Gemini generative-language API.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client with the default base URL and model.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        Self::with_settings(api_key, DEFAULT_BASE_URL, DEFAULT_MODEL, timeout)
    }

    /// Create a client against a specific base URL and model.
    pub fn with_settings(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// The model this client targets.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::from_prompt(prompt);
        debug!(model = %self.model, prompt_len = prompt.len(), "calling generateContent");

        let response = self
            .client
            .post(self.request_url())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.text().ok_or(GenerationError::EmptyResponse)
    }
}
