//! Pipeline failure taxonomy.
//!
//! Every stage failure in the request pipeline is mapped into exactly one
//! of these variants at the pipeline boundary. The HTTP status mapping
//! lives in the server crate; this enum only carries the classification
//! and the human-readable detail.

/// Errors produced by the audio processing pipeline.
///
/// The set is closed: collaborator libraries raise their own error types,
/// and the pipeline translates each into one of these kinds before the
/// error crosses the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Declared media type of the upload does not indicate audio.
    #[error("unsupported media type: {media_type}")]
    UnsupportedMediaType {
        /// The media type the client declared.
        media_type: String,
    },

    /// Scratch file or directory could not be created or written.
    #[error("storage error: {message}")]
    Storage {
        /// Description of the failed filesystem operation.
        message: String,
    },

    /// Uploaded audio could not be decoded or re-encoded.
    #[error("error converting audio file: {message}")]
    Transcode {
        /// Description from the audio decoder.
        message: String,
    },

    /// The recognizer parsed the audio but found no intelligible speech.
    #[error("speech recognition could not understand the audio")]
    UnintelligibleAudio,

    /// The recognizer service itself failed (unreachable, non-2xx, timeout).
    #[error("speech recognition service error: {message}")]
    TranscriptionService {
        /// Description of the service failure.
        message: String,
    },

    /// The generation backend failed (any cause).
    #[error("error generating response: {message}")]
    GenerationService {
        /// Description of the service failure.
        message: String,
    },

    /// Unclassified failure (task join, request plumbing).
    #[error("internal error: {message}")]
    Internal {
        /// Description.
        message: String,
    },
}

impl PipelineError {
    /// Stable snake_case label for log fields and assertions.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedMediaType { .. } => "unsupported_media_type",
            Self::Storage { .. } => "storage",
            Self::Transcode { .. } => "transcode",
            Self::UnintelligibleAudio => "unintelligible_audio",
            Self::TranscriptionService { .. } => "transcription_service",
            Self::GenerationService { .. } => "generation_service",
            Self::Internal { .. } => "internal",
        }
    }

    /// Whether the failure is the client's fault (maps to a 4xx status).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMediaType { .. }
                | Self::Transcode { .. }
                | Self::UnintelligibleAudio
        )
    }
}
