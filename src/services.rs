//! Collaborator contracts.
//!
//! The pipelines depend on these traits rather than on any particular
//! database, settings backend or error tracker. Each generator receives a
//! [`Services`] bundle at construction; the CLI wires in
//! [`JsonStore`](crate::store::JsonStore) and the tracing-based
//! implementations below, tests wire in the fakes from `test_helpers`.
//!
//! Calls on [`CacheBuster`] and [`ErrorReporter`] are fire-and-forget: they
//! return nothing and must not fail the caller.

use crate::types::{Article, ImageTarget, Organization, SubforemId, User};
use crate::upload::Uploader;
use std::error::Error;
use std::io;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Per-subforem key-value settings.
pub trait SettingsStore {
    /// The 512px logo URL for a subforem; `None` when unset.
    fn logo_png(&self, subforem: SubforemId) -> Result<Option<String>, StoreError>;
    fn set_resized_logo(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError>;
    fn set_favicon_url(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError>;
    fn set_main_social_image(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError>;
    fn set_logo_png(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError>;
}

pub trait SubforemDirectory {
    /// Subforem used for resources that have none.
    fn default_id(&self) -> SubforemId;
    fn exists(&self, subforem: SubforemId) -> Result<bool, StoreError>;
}

/// Lookup and persistence of the resources images are generated for.
pub trait ResourceStore {
    fn user(&self, id: u64) -> Result<User, StoreError>;
    fn organization(&self, id: u64) -> Result<Organization, StoreError>;
    fn articles_by_user(&self, user_id: u64) -> Result<Vec<Article>, StoreError>;
    fn articles_by_organization(&self, organization_id: u64) -> Result<Vec<Article>, StoreError>;
    /// Regular save of `articles.social_image`.
    fn save_article_social_image(&self, article_id: u64, url: &str) -> Result<(), StoreError>;
    /// Direct column update of the profile social image; skips validations.
    fn update_profile_social_image(&self, user_id: u64, url: &str) -> Result<(), StoreError>;
}

/// Invalidates cached pages that embed a resource's social image.
pub trait CacheBuster {
    fn bust(&self, target: &ImageTarget);
}

/// Error tracking.
pub trait ErrorReporter {
    fn notify(&self, error: &(dyn Error + 'static));
}

/// Borrowed collaborators injected into the generators.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub settings: &'a dyn SettingsStore,
    pub subforems: &'a dyn SubforemDirectory,
    pub resources: &'a dyn ResourceStore,
    pub uploader: &'a dyn Uploader,
    pub cache_buster: &'a dyn CacheBuster,
    pub reporter: &'a dyn ErrorReporter,
}

/// Reports errors as `error!` events, including the source chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn notify(&self, error: &(dyn Error + 'static)) {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        error!(error = %error, causes = ?chain, "reported error");
    }
}

/// Cache invalidation that only logs; there is no edge cache in front of
/// the local uploader.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingCacheBuster;

impl CacheBuster for LoggingCacheBuster {
    fn bust(&self, target: &ImageTarget) {
        info!(%target, "cache bust requested");
    }
}
