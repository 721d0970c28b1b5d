//! Audio transcoding to the canonical format.
//!
//! All uploaded audio is converted to a single fixed encoding before it is
//! sent to the recognizer: 16kHz mono 16-bit PCM in a WAV container.
//!
//! ```text
//! upload bytes → symphonia decode → mono mixdown
//! → rubato resample to 16kHz → PCM16 WAV bytes
//! ```

#![deny(unsafe_code)]

pub mod decode;
pub mod wav;

pub use decode::{TARGET_SAMPLE_RATE, decode_audio};
pub use wav::encode_wav;

/// Errors that can occur while transcoding audio.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Audio decoding failure (unsupported format, corrupt data).
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Resampling failure.
    #[error("resample error: {0}")]
    Resample(String),

    /// I/O error (file read/write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert arbitrary-format audio bytes to canonical 16kHz mono PCM16 WAV.
pub fn transcode_to_wav(data: &[u8], media_type: &str) -> Result<Vec<u8>, AudioError> {
    let samples = decode_audio(data, media_type)?;
    tracing::debug!(input_bytes = data.len(), samples = samples.len(), "audio transcoded");
    Ok(encode_wav(&samples))
}
