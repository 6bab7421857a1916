//! Shared test utilities for the social-images test suite.
//!
//! In-memory collaborators that record every call, so tests can assert on
//! how often the pipelines hit the store and what they wrote back, plus
//! builders for the resource types.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut fixture = Fixture::new();
//! fixture.store.users.push(user(10, "Ada", None));
//! fixture.store.articles.push(article(100, "Hello", 10));
//!
//! let services = fixture.services();
//! // ... run a pipeline ...
//! assert_eq!(*fixture.store.article_writes.borrow(), vec![(100, url)]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};

use crate::services::{
    CacheBuster, ErrorReporter, ResourceStore, Services, SettingsStore, StoreError,
    SubforemDirectory,
};
use crate::types::{Article, ImageTarget, Organization, SubforemId, User};
use crate::upload::{UploadError, Uploader};

// =========================================================================
// Builders
// =========================================================================

pub fn user(id: u64, name: &str, profile_image: Option<&str>) -> User {
    User {
        id,
        name: name.to_string(),
        username: name.to_lowercase(),
        profile_image: profile_image.map(str::to_string),
        brand_color: None,
        subforem_id: None,
        social_image: None,
    }
}

pub fn organization(id: u64, brand_color: Option<&str>) -> Organization {
    Organization {
        id,
        name: format!("Org {id}"),
        brand_color: brand_color.map(str::to_string),
        subforem_id: None,
    }
}

pub fn article(id: u64, title: &str, user_id: u64) -> Article {
    Article {
        id,
        title: title.to_string(),
        user_id,
        organization_id: None,
        subforem_id: None,
        main_image: None,
        social_image: None,
        published_at: None,
    }
}

// =========================================================================
// FakeStore
// =========================================================================

/// Settings, subforem directory and resources in one recording fake.
///
/// Plain fields configure it; `RefCell` fields record calls.
pub struct FakeStore {
    pub default_id: SubforemId,
    pub subforems: Vec<SubforemId>,
    /// `exists` fails with this message when set.
    pub directory_error: Option<String>,
    pub logos: HashMap<SubforemId, String>,
    /// `logo_png` fails for this subforem.
    pub failing_logo: Option<SubforemId>,
    /// Settings setter (by name, e.g. `"favicon_url"`) that fails.
    pub failing_setting: Option<&'static str>,
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
    pub articles: Vec<Article>,
    /// Article listings fail when set.
    pub listing_error: Option<String>,
    /// Article saves fail for this article id.
    pub failing_article_save: Option<u64>,

    pub logo_lookups: RefCell<Vec<SubforemId>>,
    pub settings_writes: RefCell<Vec<(&'static str, String, SubforemId)>>,
    pub user_lookups: RefCell<Vec<u64>>,
    pub organization_lookups: RefCell<Vec<u64>>,
    pub article_writes: RefCell<Vec<(u64, String)>>,
    pub profile_writes: RefCell<Vec<(u64, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            default_id: SubforemId(1),
            subforems: vec![SubforemId(1)],
            directory_error: None,
            logos: HashMap::new(),
            failing_logo: None,
            failing_setting: None,
            users: Vec::new(),
            organizations: Vec::new(),
            articles: Vec::new(),
            listing_error: None,
            failing_article_save: None,
            logo_lookups: RefCell::new(Vec::new()),
            settings_writes: RefCell::new(Vec::new()),
            user_lookups: RefCell::new(Vec::new()),
            organization_lookups: RefCell::new(Vec::new()),
            article_writes: RefCell::new(Vec::new()),
            profile_writes: RefCell::new(Vec::new()),
        }
    }

    fn write_setting(
        &self,
        name: &'static str,
        url: &str,
        subforem: SubforemId,
    ) -> Result<(), StoreError> {
        if self.failing_setting == Some(name) {
            return Err(StoreError::Rejected(format!("{name} write failed")));
        }
        self.settings_writes
            .borrow_mut()
            .push((name, url.to_string(), subforem));
        Ok(())
    }

    /// Names of the settings written, in order.
    pub fn written_settings(&self) -> Vec<&'static str> {
        self.settings_writes
            .borrow()
            .iter()
            .map(|(name, _, _)| *name)
            .collect()
    }
}

impl SettingsStore for FakeStore {
    fn logo_png(&self, subforem: SubforemId) -> Result<Option<String>, StoreError> {
        self.logo_lookups.borrow_mut().push(subforem);
        if self.failing_logo == Some(subforem) {
            return Err(StoreError::Rejected("settings unavailable".into()));
        }
        Ok(self.logos.get(&subforem).cloned())
    }

    fn set_resized_logo(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.write_setting("resized_logo", url, subforem)
    }

    fn set_favicon_url(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.write_setting("favicon_url", url, subforem)
    }

    fn set_main_social_image(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.write_setting("main_social_image", url, subforem)
    }

    fn set_logo_png(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.write_setting("logo_png", url, subforem)
    }
}

impl SubforemDirectory for FakeStore {
    fn default_id(&self) -> SubforemId {
        self.default_id
    }

    fn exists(&self, subforem: SubforemId) -> Result<bool, StoreError> {
        match &self.directory_error {
            Some(message) => Err(StoreError::Rejected(message.clone())),
            None => Ok(self.subforems.contains(&subforem)),
        }
    }
}

impl ResourceStore for FakeStore {
    fn user(&self, id: u64) -> Result<User, StoreError> {
        self.user_lookups.borrow_mut().push(id);
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "user", id })
    }

    fn organization(&self, id: u64) -> Result<Organization, StoreError> {
        self.organization_lookups.borrow_mut().push(id);
        self.organizations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "organization",
                id,
            })
    }

    fn articles_by_user(&self, user_id: u64) -> Result<Vec<Article>, StoreError> {
        if let Some(message) = &self.listing_error {
            return Err(StoreError::Rejected(message.clone()));
        }
        Ok(self
            .articles
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn articles_by_organization(&self, organization_id: u64) -> Result<Vec<Article>, StoreError> {
        if let Some(message) = &self.listing_error {
            return Err(StoreError::Rejected(message.clone()));
        }
        Ok(self
            .articles
            .iter()
            .filter(|a| a.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    fn save_article_social_image(&self, article_id: u64, url: &str) -> Result<(), StoreError> {
        if self.failing_article_save == Some(article_id) {
            return Err(StoreError::Rejected("validation failed".into()));
        }
        self.article_writes
            .borrow_mut()
            .push((article_id, url.to_string()));
        Ok(())
    }

    fn update_profile_social_image(&self, user_id: u64, url: &str) -> Result<(), StoreError> {
        self.profile_writes
            .borrow_mut()
            .push((user_id, url.to_string()));
        Ok(())
    }
}

// =========================================================================
// Uploader / cache buster / reporter
// =========================================================================

/// Hands out sequential URLs and records what it was asked to store.
#[derive(Default)]
pub struct RecordingUploader {
    pub stored: RefCell<Vec<PathBuf>>,
    /// Every upload fails with this message when set.
    pub fail_with: Option<String>,
}

impl Uploader for RecordingUploader {
    fn store(&self, file: &Path) -> Result<String, UploadError> {
        if let Some(message) = &self.fail_with {
            return Err(UploadError::Rejected(message.clone()));
        }
        let mut stored = self.stored.borrow_mut();
        stored.push(file.to_path_buf());
        Ok(format!("https://cdn.example.com/uploads/{}.png", stored.len()))
    }
}

#[derive(Default)]
pub struct RecordingCacheBuster {
    pub busted: RefCell<Vec<ImageTarget>>,
}

impl CacheBuster for RecordingCacheBuster {
    fn bust(&self, target: &ImageTarget) {
        self.busted.borrow_mut().push(*target);
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub errors: RefCell<Vec<String>>,
}

impl ErrorReporter for RecordingReporter {
    fn notify(&self, error: &(dyn Error + 'static)) {
        self.errors.borrow_mut().push(error.to_string());
    }
}

// =========================================================================
// Fixture
// =========================================================================

/// Owns one of each fake so tests can borrow a [`Services`] bundle.
pub struct Fixture {
    pub store: FakeStore,
    pub uploader: RecordingUploader,
    pub cache_buster: RecordingCacheBuster,
    pub reporter: RecordingReporter,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: FakeStore::new(),
            uploader: RecordingUploader::default(),
            cache_buster: RecordingCacheBuster::default(),
            reporter: RecordingReporter::default(),
        }
    }

    pub fn services(&self) -> Services<'_> {
        Services {
            settings: &self.store,
            subforems: &self.store,
            resources: &self.store,
            uploader: &self.uploader,
            cache_buster: &self.cache_buster,
            reporter: &self.reporter,
        }
    }
}
