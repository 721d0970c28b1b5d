//! Gemini API request/response types.
//!
//! Only the subset of the `generateContent` wire format this service uses.

use serde::{Deserialize, Serialize};

/// Default base URL for API-key access.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model ID.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// `generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn for this service.
    pub contents: Vec<Content>,
}

/// One conversation turn.
#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    /// Turn role (`"user"` or `"model"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    pub parts: Vec<Part>,
}

/// One content part.
#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    /// Text payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    /// Generated candidates; the first one carries the reply.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// One generated candidate.
#[derive(Debug, Deserialize)]
pub struct Candidate {
    /// Generated content.
    pub content: Option<Content>,
}

impl GenerateContentRequest {
    /// Build a single-turn user request from a prompt string.
    #[must_use]
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    ///
    /// Returns `None` when there is no candidate or no text part.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
