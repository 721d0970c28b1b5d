//! # voxrelay-server
//!
//! Axum HTTP surface and the per-request processing pipeline.
//!
//! - `POST /process-audio`: multipart audio upload → transcode → transcribe
//!   → generate → JSON response
//! - `GET /health`: liveness probe
//! - Scratch-file guard: every request's temporary files live in a
//!   uuid-named directory that is removed on every exit path
//! - Error translation: collaborator failures map to the closed
//!   [`voxrelay_core::PipelineError`] taxonomy and from there to HTTP

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod pipeline;
pub mod scratch;
pub mod server;

pub use config::Settings;
pub use server::{AppState, router};
