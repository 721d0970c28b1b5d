//! Per-request scratch directory with guaranteed removal.
//!
//! Each request owns a directory named by its [`RequestId`], so concurrent
//! requests can never read or delete each other's files. The directory is
//! removed in `Drop`, which runs on success, on any mapped failure, and
//! when the request future is dropped mid-flight (client disconnect).
//! Deletion failures are logged, never surfaced, so they cannot mask the
//! request's primary outcome.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use voxrelay_core::RequestId;

/// Scratch directory holding the two temporary files of one request.
pub struct Scratch {
    dir: PathBuf,
    upload: PathBuf,
    canonical: PathBuf,
}

impl Scratch {
    /// Create `{root}/{request_id}/` and lay out the two file paths.
    pub fn create(root: &Path, id: &RequestId, media_type: &str) -> std::io::Result<Self> {
        let dir = root.join(id.as_str());
        std::fs::create_dir_all(&dir)?;
        let upload = dir.join(format!("upload.{}", upload_extension(media_type)));
        let canonical = dir.join("audio.wav");
        Ok(Self {
            dir,
            upload,
            canonical,
        })
    }

    /// Path for the raw uploaded bytes.
    #[must_use]
    pub fn upload_path(&self) -> &Path {
        &self.upload
    }

    /// Path for the canonical re-encoded WAV.
    #[must_use]
    pub fn canonical_path(&self) -> &Path {
        &self.canonical
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => debug!(dir = %self.dir.display(), "scratch cleaned up"),
            Err(e) => warn!(dir = %self.dir.display(), error = %e, "scratch cleanup failed"),
        }
    }
}

/// File extension for the upload, from the declared media type.
///
/// The extension matters: container probing uses it as a format hint.
fn upload_extension(media_type: &str) -> &'static str {
    match media_type {
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => "m4a",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" | "audio/vorbis" => "ogg",
        "audio/webm" => "webm",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        _ => "bin",
    }
}
