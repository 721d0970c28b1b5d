//! # voxrelay
//!
//! Voice relay server binary — wires the backend clients together and
//! starts the HTTP server.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxrelay_llm::GeminiClient;
use voxrelay_server::config::{self, Settings};
use voxrelay_server::{AppState, router};
use voxrelay_stt::HttpRecognizer;

/// Voice relay server.
#[derive(Parser, Debug)]
#[command(name = "voxrelay", about = "Audio upload to transcript and generated reply")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn default_settings_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home).join(".voxrelay").join("settings.json")
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(Cli::default_settings_path);
    let mut settings: Settings = config::load_settings_from_path(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
    if let Some(host) = cli.host {
        settings.host = host;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    // Refuse to start without the API credential.
    settings.validate()?;

    std::fs::create_dir_all(&settings.scratch_dir)
        .with_context(|| format!("failed to create {}", settings.scratch_dir.display()))?;

    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let recognizer = Arc::new(HttpRecognizer::new(
        settings.recognizer.base_url.clone(),
        timeout,
    )?);
    let api_key = settings
        .generation
        .api_key
        .clone()
        .context("generation api_key missing after validation")?;
    let generator = Arc::new(GeminiClient::with_settings(
        api_key,
        settings.generation.base_url.clone(),
        settings.generation.model.clone(),
        timeout,
    )?);

    let state = AppState::new(&settings, recognizer, generator);
    let app = router(state, settings.max_upload_bytes);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, model = %settings.generation.model, "voxrelay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("voxrelay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
