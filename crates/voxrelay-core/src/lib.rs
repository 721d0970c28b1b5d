//! # voxrelay-core
//!
//! Foundation types for the voxrelay service.
//!
//! This crate provides the shared vocabulary the other voxrelay crates
//! depend on:
//!
//! - **`PipelineError`**: the closed failure taxonomy for the request
//!   pipeline, one variant per stage-level failure kind
//! - **`RequestId`**: UUID v7 newtype used to scope per-request scratch
//!   files so concurrent requests never collide

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;

pub use errors::PipelineError;
pub use ids::RequestId;
