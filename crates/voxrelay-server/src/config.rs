//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`Settings::default()`]
//! 2. If a settings file exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Default maximum upload size (50 MB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Errors raised while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contained invalid JSON or the wrong shape.
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// The Gemini API key is absent; the process must not start without it.
    #[error("VOXRELAY_GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
}

/// Recognizer backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerSettings {
    /// Base URL of the speech-to-text service.
    pub base_url: String,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8771".into(),
        }
    }
}

/// Generation backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// API credential. Required; validated at startup.
    pub api_key: Option<String>,
    /// Base URL of the generative-language API.
    pub base_url: String,
    /// Model ID to request.
    pub model: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: voxrelay_llm::DEFAULT_BASE_URL.into(),
            model: voxrelay_llm::DEFAULT_MODEL.into(),
        }
    }
}

/// Service configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Root directory for per-request scratch directories.
    pub scratch_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Bound on each outbound backend call, in seconds.
    pub request_timeout_secs: u64,
    /// Recognizer backend.
    pub recognizer: RecognizerSettings,
    /// Generation backend.
    pub generation: GenerationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            scratch_dir: std::env::temp_dir().join("voxrelay"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout_secs: 30,
            recognizer: RecognizerSettings::default(),
            generation: GenerationSettings::default(),
        }
    }
}

impl Settings {
    /// Check startup invariants. The API credential is required.
    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.generation.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(SettingsError::MissingApiKey),
        }
    }
}

/// Load settings from `path` with env var overrides.
///
/// If the file does not exist, returns defaults (plus overrides). If the
/// file contains invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<Settings, SettingsError> {
    let defaults = serde_json::to_value(Settings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: Settings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `VOXRELAY_*` environment overrides.
///
/// Takes the variable lookup as a closure so tests can drive it without
/// mutating process environment.
pub fn apply_env_overrides<F>(settings: &mut Settings, get: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = get("VOXRELAY_HOST") {
        settings.host = v;
    }
    if let Some(v) = get("VOXRELAY_PORT") {
        if let Ok(port) = v.parse() {
            settings.port = port;
        }
    }
    if let Some(v) = get("VOXRELAY_SCRATCH_DIR") {
        settings.scratch_dir = PathBuf::from(v);
    }
    if let Some(v) = get("VOXRELAY_MAX_UPLOAD_BYTES") {
        if let Ok(n) = v.parse() {
            settings.max_upload_bytes = n;
        }
    }
    if let Some(v) = get("VOXRELAY_REQUEST_TIMEOUT_SECS") {
        if let Ok(n) = v.parse() {
            settings.request_timeout_secs = n;
        }
    }
    if let Some(v) = get("VOXRELAY_RECOGNIZER_URL") {
        settings.recognizer.base_url = v;
    }
    if let Some(v) = get("VOXRELAY_GEMINI_API_KEY") {
        settings.generation.api_key = Some(v);
    }
    if let Some(v) = get("VOXRELAY_GEMINI_BASE_URL") {
        settings.generation.base_url = v;
    }
    if let Some(v) = get("VOXRELAY_GEMINI_MODEL") {
        settings.generation.model = v;
    }
}
