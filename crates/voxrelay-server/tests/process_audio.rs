//! Router-level tests for the audio processing pipeline.
//!
//! Backends are stubbed at the trait seam with atomic call counters so the
//! tests can assert both the HTTP outcome and the outbound call pattern
//! (single call, no retries, generation skipped after transcription
//! failures). Scratch hygiene is checked by diffing the scratch root.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;
use voxrelay_audio::wav::test_support::generate_test_wav;
use voxrelay_llm::{GenerationError, GenerationProvider};
use voxrelay_server::config::Settings;
use voxrelay_server::{AppState, router};
use voxrelay_stt::{SpeechToText, SttError};

// ── Stub backends ───────────────────────────────────────────────────

#[derive(Clone)]
enum RecognizerMode {
    /// Return a fixed transcript.
    Fixed(&'static str),
    /// Derive the transcript from the canonical file's PCM sample count.
    FromContent,
    /// Signal "could not understand the audio".
    NotUnderstood,
    /// Signal a backend service failure.
    ServiceError,
}

struct StubRecognizer {
    mode: RecognizerMode,
    calls: AtomicUsize,
}

impl StubRecognizer {
    fn new(mode: RecognizerMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for StubRecognizer {
    async fn transcribe(&self, wav_path: &Path) -> Result<String, SttError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            RecognizerMode::Fixed(text) => Ok((*text).to_string()),
            RecognizerMode::FromContent => {
                let bytes = tokio::fs::read(wav_path).await?;
                // 44-byte canonical WAV header, 2 bytes per PCM16 sample.
                Ok(format!("samples:{}", (bytes.len() - 44) / 2))
            }
            RecognizerMode::NotUnderstood => Err(SttError::NotUnderstood),
            RecognizerMode::ServiceError => Err(SttError::Service {
                message: "recognizer unavailable".into(),
            }),
        }
    }
}

struct StubGenerator {
    fail: bool,
    calls: AtomicUsize,
}

impl StubGenerator {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::Api {
                status: 500,
                message: "backend exploded".into(),
            });
        }
        Ok(match prompt {
            "turn on the lights" => "Lights are now on.".to_string(),
            other => format!("echo: {other}"),
        })
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    app: Router,
    recognizer: Arc<StubRecognizer>,
    generator: Arc<StubGenerator>,
    scratch_root: tempfile::TempDir,
}

fn harness(recognizer_mode: RecognizerMode, generator_fails: bool) -> Harness {
    let scratch_root = tempfile::tempdir().unwrap();
    let recognizer = StubRecognizer::new(recognizer_mode);
    let generator = StubGenerator::new(generator_fails);

    let settings = Settings {
        scratch_dir: scratch_root.path().to_path_buf(),
        ..Settings::default()
    };
    let state = AppState::new(&settings, recognizer.clone(), generator.clone());
    let app = router(state, settings.max_upload_bytes);

    Harness {
        app,
        recognizer,
        generator,
        scratch_root,
    }
}

impl Harness {
    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_root.path()).unwrap().count()
    }
}

const BOUNDARY: &str = "voxrelay-test-boundary";

fn multipart_request(field_name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
             filename=\"clip\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/process-audio")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn end_to_end_success() {
    let h = harness(RecognizerMode::Fixed("turn on the lights"), false);
    let wav = generate_test_wav(16000, 1, 1600);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "audio/wav", &wav))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["recognized_text"], "turn on the lights");
    assert_eq!(body["generated_response"], "Lights are now on.");

    // Exactly one call each, no retries.
    assert_eq!(h.recognizer.call_count(), 1);
    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn non_audio_media_type_is_rejected_before_any_file_write() {
    let h = harness(RecognizerMode::Fixed("unused"), false);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_matches!(body["detail"].as_str(), Some(d) => {
        assert!(d.contains("unsupported media type"), "{d}");
    });

    assert_eq!(h.scratch_entries(), 0, "no scratch entry may be created");
    assert_eq!(h.recognizer.call_count(), 0);
    assert_eq!(h.generator.call_count(), 0);
}

#[tokio::test]
async fn undecodable_audio_is_a_400_and_leaves_no_files() {
    let h = harness(RecognizerMode::Fixed("unused"), false);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "audio/wav", b"not really audio"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_matches!(body["detail"].as_str(), Some(d) => {
        assert!(d.contains("error converting audio file"), "{d}");
    });

    assert_eq!(h.scratch_entries(), 0);
    assert_eq!(h.recognizer.call_count(), 0);
}

#[tokio::test]
async fn unintelligible_audio_skips_generation() {
    let h = harness(RecognizerMode::NotUnderstood, false);
    let wav = generate_test_wav(16000, 1, 1600);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "audio/wav", &wav))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_matches!(body["detail"].as_str(), Some(d) => {
        assert!(d.contains("could not understand"), "{d}");
    });

    assert_eq!(h.recognizer.call_count(), 1);
    assert_eq!(h.generator.call_count(), 0, "generation must not run");
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn recognizer_service_error_skips_generation() {
    let h = harness(RecognizerMode::ServiceError, false);
    let wav = generate_test_wav(16000, 1, 1600);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "audio/wav", &wav))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(h.recognizer.call_count(), 1);
    assert_eq!(h.generator.call_count(), 0);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn generation_failure_is_a_500_without_generated_text() {
    let h = harness(RecognizerMode::Fixed("turn on the lights"), true);
    let wav = generate_test_wav(16000, 1, 1600);

    let response = h
        .app
        .clone()
        .oneshot(multipart_request("file", "audio/wav", &wav))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body.get("generated_response").is_none());
    assert_matches!(body["detail"].as_str(), Some(d) => {
        assert!(d.contains("error generating response"), "{d}");
    });

    // One attempt only — failures are not retried.
    assert_eq!(h.generator.call_count(), 1);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn storage_failure_is_a_500() {
    // Point the scratch root below a regular file so directory creation fails.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"occupied").unwrap();

    let recognizer = StubRecognizer::new(RecognizerMode::Fixed("unused"));
    let generator = StubGenerator::new(false);
    let settings = Settings {
        scratch_dir: blocker.join("nested"),
        ..Settings::default()
    };
    let state = AppState::new(&settings, recognizer.clone(), generator.clone());
    let app = router(state, settings.max_upload_bytes);

    let wav = generate_test_wav(16000, 1, 1600);
    let response = app
        .oneshot(multipart_request("file", "audio/wav", &wav))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_matches!(body["detail"].as_str(), Some(d) => {
        assert!(d.contains("storage error"), "{d}");
    });
    assert_eq!(recognizer.call_count(), 0);
}

#[tokio::test]
async fn missing_file_field_is_a_400() {
    let h = harness(RecognizerMode::Fixed("unused"), false);

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\njust text\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/process-audio")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "missing audio file field");
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn concurrent_requests_do_not_cross_talk() {
    let h = harness(RecognizerMode::FromContent, false);

    // Different sample counts make the two canonical files distinguishable.
    let wav_a = generate_test_wav(16000, 1, 1600);
    let wav_b = generate_test_wav(16000, 1, 3200);

    let (resp_a, resp_b) = tokio::join!(
        h.app
            .clone()
            .oneshot(multipart_request("file", "audio/wav", &wav_a)),
        h.app
            .clone()
            .oneshot(multipart_request("file", "audio/wav", &wav_b)),
    );

    let resp_a = resp_a.unwrap();
    let resp_b = resp_b.unwrap();
    assert_eq!(resp_a.status(), StatusCode::OK);
    assert_eq!(resp_b.status(), StatusCode::OK);

    let body_a = json_body(resp_a).await;
    let body_b = json_body(resp_b).await;
    assert_eq!(body_a["recognized_text"], "samples:1600");
    assert_eq!(body_b["recognized_text"], "samples:3200");

    assert_eq!(h.recognizer.call_count(), 2);
    assert_eq!(h.scratch_entries(), 0);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let h = harness(RecognizerMode::Fixed("unused"), false);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}
