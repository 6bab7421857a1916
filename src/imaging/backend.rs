//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the image primitive the pipelines are built
//! on: open a source, resize it, composite layers, draw text, write a PNG.
//! The pipelines never touch pixels themselves; they describe the image as
//! parameters (see [`params`](super::params)) and hand them to a backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): pure Rust, decoding
//! with the `image` crate and rasterising text with `rusttype`.

use super::params::{CompositionPlan, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("{0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// Both operations write a PNG to `output`; the caller owns that path
/// (normally a scoped temp file from [`upload`](crate::upload)).
pub trait ImageBackend {
    /// Open `params.source` and fit it inside `width × height`.
    fn resize(&self, params: &ResizeParams, output: &Path) -> Result<(), BackendError>;

    /// Build a fresh canvas from `plan` and write it out.
    fn compose(&self, plan: &CompositionPlan, output: &Path) -> Result<(), BackendError>;
}
