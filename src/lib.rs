//! # Social Images
//!
//! Generates the share images of a community platform: a 1000×500 social
//! card per article or user profile, and the four branding images of a
//! subforem (the tenant that owns a logo and favicon).
//!
//! # Architecture: Two Pipelines
//!
//! ```text
//! Social    article / user / organization  →  card per qualifying article  →  upload  →  resource.social_image
//! Branding  subforem + logo URL            →  4 derived images             →  upload  →  subforem settings
//! ```
//!
//! Both pipelines follow the same shape: decide *what* the image contains as
//! plain parameters, hand them to an [`ImageBackend`](imaging::ImageBackend),
//! upload the result from a scoped temp file, and write the URL back through
//! a collaborator trait. Everything outside image generation (the database,
//! blob storage, error tracking) is behind the traits in [`services`], which
//! keeps the pipelines testable with in-memory fakes and a recording backend.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Expands a resource into qualifying articles and renders each, owning the run's caches |
//! | [`social`] | One social card: resolve, plan, render, upload, persist; the error boundary |
//! | [`branding`] | Resized logo, favicon, main social image and logo png for a subforem |
//! | [`cache`] | Last-seen subforem logo cache and per-run author cache |
//! | [`text`] | Title truncation, font size and wrap heuristics, fill color |
//! | [`imaging`] | Parameter types, layout, `ImageBackend` trait and the pure-Rust backend |
//! | [`upload`] | Scoped temp files, the `Uploader` trait, content-addressed local uploads |
//! | [`services`] | Collaborator traits (settings, directory, resources, cache busting, errors) |
//! | [`store`] | JSON-file implementation of the store traits used by the CLI |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`types`] | Resources, subforem ids, image targets, social cards |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fresh Canvas Per Image
//!
//! Every card starts from the template on disk. Nothing composed for one
//! article can leak into the next, and two calls for the same article build
//! two independent images.
//!
//! ## Last-Seen Logo Cache
//!
//! Batches walk one user's or organization's articles, which nearly always
//! share a subforem. Remembering only the previous subforem's logo costs one
//! settings query per run of equal subforems, with no invalidation concerns
//! beyond the batch itself. See [`cache`].
//!
//! ## Errors Stop at the Image
//!
//! A failed card or branding step is logged and reported, never raised: the
//! resource keeps its previous image and the batch continues. The single
//! exception is branding for a subforem that does not exist, which fails
//! before any work is done.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for decoding, resampling and
//! compositing and `rusttype` for text. No ImageMagick, no system libraries:
//! the binary is self-contained.

pub mod batch;
pub mod branding;
pub mod cache;
pub mod config;
pub mod imaging;
pub mod output;
pub mod services;
pub mod social;
pub mod store;
pub mod text;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
