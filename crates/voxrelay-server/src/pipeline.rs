//! The per-request processing pipeline.
//!
//! Stages run strictly in order and short-circuit on the first failure:
//!
//! ```text
//! validate media type → persist upload → transcode to canonical WAV
//! → transcribe → generate
//! ```
//!
//! The [`Scratch`](crate::scratch::Scratch) guard created at the persist
//! stage owns both temporary files; dropping it on any exit path is what
//! upholds the no-leftover-files invariant. Neither backend call is ever
//! retried, and the generation backend is only reached after a successful
//! transcription.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use voxrelay_audio::AudioError;
use voxrelay_core::{PipelineError, RequestId};
use voxrelay_stt::SttError;

use crate::scratch::Scratch;
use crate::server::AppState;

/// Success payload of `POST /process-audio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAudioResponse {
    /// Text recognized from the uploaded audio.
    pub recognized_text: String,
    /// Reply generated from the recognized text.
    pub generated_response: String,
}

/// Run the pipeline for one upload.
pub async fn run(
    state: &AppState,
    media_type: &str,
    data: &Bytes,
) -> Result<ProcessAudioResponse, PipelineError> {
    // Validate before anything touches the filesystem.
    if !media_type.starts_with("audio/") {
        return Err(PipelineError::UnsupportedMediaType {
            media_type: media_type.to_string(),
        });
    }

    let request_id = RequestId::new();
    let scratch =
        Scratch::create(&state.scratch_root, &request_id, media_type).map_err(|e| {
            PipelineError::Storage {
                message: format!("failed to create scratch directory: {e}"),
            }
        })?;

    tokio::fs::write(scratch.upload_path(), data)
        .await
        .map_err(|e| PipelineError::Storage {
            message: format!("failed to persist upload: {e}"),
        })?;

    // Decode/resample is CPU-bound; keep it off the async runtime.
    let upload_path = scratch.upload_path().to_path_buf();
    let media = media_type.to_string();
    let wav = tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&upload_path).map_err(AudioError::Io)?;
        voxrelay_audio::transcode_to_wav(&bytes, &media)
    })
    .await
    .map_err(|e| PipelineError::Internal {
        message: format!("transcode task join failed: {e}"),
    })?
    .map_err(|e| match e {
        AudioError::Io(io) => PipelineError::Storage {
            message: format!("failed to read upload: {io}"),
        },
        other => PipelineError::Transcode {
            message: other.to_string(),
        },
    })?;

    tokio::fs::write(scratch.canonical_path(), &wav)
        .await
        .map_err(|e| PipelineError::Storage {
            message: format!("failed to write canonical audio: {e}"),
        })?;

    let recognized_text = state
        .recognizer
        .transcribe(scratch.canonical_path())
        .await
        .map_err(|e| match e {
            SttError::NotUnderstood => PipelineError::UnintelligibleAudio,
            SttError::Service { message } => PipelineError::TranscriptionService { message },
            SttError::Io(io) => PipelineError::Storage {
                message: format!("failed to read canonical audio: {io}"),
            },
        })?;
    info!(request_id = %request_id, text = %recognized_text, "speech recognized");

    let generated_response = state
        .generator
        .generate(&recognized_text)
        .await
        .map_err(|e| PipelineError::GenerationService {
            message: e.to_string(),
        })?;
    info!(
        request_id = %request_id,
        reply_len = generated_response.len(),
        "reply generated"
    );

    Ok(ProcessAudioResponse {
        recognized_text,
        generated_response,
    })
    // `scratch` drops here (and on every early return above), removing
    // both temporary files.
}
