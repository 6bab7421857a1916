//! Lookup caches for a single generation run.
//!
//! Batch runs render many articles that share a subforem and, often, an
//! author. Both caches here exist to avoid repeating the same store query
//! for every card in a run. Neither is persisted; every run starts cold.
//!
//! # LogoCache
//!
//! Articles listed for a user or organization usually belong to one
//! subforem, so the logo cache keeps only the **last** subforem it looked up
//! and that subforem's logo URL. A lookup for the same subforem is answered
//! from the slot; any other subforem replaces it.
//!
//! This means exactly one settings query per contiguous run of the same
//! subforem. Non-contiguous repeats miss:
//!
//! ```text
//! A A A B A   →   3 lookups (A, B, A)
//! ```
//!
//! A `None` or empty logo is cached like any other value, so a subforem
//! without a logo is not re-queried for every article.
//!
//! # AuthorCache
//!
//! Resolves each distinct author (display name, avatar, brand color) and
//! organization once per run and keeps them all; batches are bounded by one
//! user's or organization's articles.

use crate::services::{ResourceStore, SettingsStore, StoreError};
use crate::types::{Organization, SubforemId, User};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use tracing::debug;

/// Lookup counters for one cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Queries that reached the store.
    pub lookups: u32,
    /// Requests answered without a store query.
    pub reused: u32,
}

impl CacheStats {
    pub fn lookup(&mut self) {
        self.lookups += 1;
    }

    pub fn reuse(&mut self) {
        self.reused += 1;
    }

    pub fn total(&self) -> u32 {
        self.lookups + self.reused
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reused > 0 {
            write!(
                f,
                "{} looked up, {} reused ({} total)",
                self.lookups,
                self.reused,
                self.total()
            )
        } else {
            write!(f, "{} looked up", self.lookups)
        }
    }
}

/// Last-seen subforem logo.
#[derive(Debug)]
pub struct LogoCache {
    default_subforem: SubforemId,
    last: Option<(SubforemId, Option<String>)>,
    stats: CacheStats,
}

impl LogoCache {
    /// `default_subforem` is used for resources that have no subforem.
    pub fn new(default_subforem: SubforemId) -> Self {
        Self {
            default_subforem,
            last: None,
            stats: CacheStats::default(),
        }
    }

    /// The logo URL for `subforem`, querying `settings` only when the
    /// subforem differs from the previous successful lookup.
    ///
    /// On a store error the slot is left as it was.
    pub fn logo_for(
        &mut self,
        subforem: Option<SubforemId>,
        settings: &dyn SettingsStore,
    ) -> Result<Option<String>, StoreError> {
        let id = subforem.unwrap_or(self.default_subforem);

        if let Some((_, logo)) = self.last.as_ref().filter(|(last_id, _)| *last_id == id) {
            self.stats.reuse();
            debug!(subforem = %id, "logo cache hit");
            return Ok(logo.clone());
        }

        let logo = settings.logo_png(id)?;
        self.stats.lookup();
        debug!(subforem = %id, found = logo.is_some(), "logo cache miss");
        self.last = Some((id, logo.clone()));
        Ok(logo)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// What a card shows about its author.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorProfile {
    pub name: String,
    pub avatar_url: String,
    pub brand_color: Option<String>,
}

/// Authors and organizations resolved during one run.
#[derive(Debug)]
pub struct AuthorCache {
    backup_avatar: String,
    authors: HashMap<u64, AuthorProfile>,
    organizations: HashMap<u64, Organization>,
}

impl AuthorCache {
    /// `backup_avatar` stands in for users without a profile image.
    pub fn new(backup_avatar: &str) -> Self {
        Self {
            backup_avatar: backup_avatar.to_string(),
            authors: HashMap::new(),
            organizations: HashMap::new(),
        }
    }

    pub fn author(
        &mut self,
        user_id: u64,
        resources: &dyn ResourceStore,
    ) -> Result<&AuthorProfile, StoreError> {
        match self.authors.entry(user_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let user = resources.user(user_id)?;
                debug!(user = user_id, "resolved author");
                Ok(entry.insert(profile_of(&user, &self.backup_avatar)))
            }
        }
    }

    /// Profile of a user already in hand; fills the cache without a query.
    pub fn author_of(&mut self, user: &User) -> &AuthorProfile {
        self.authors
            .entry(user.id)
            .or_insert_with(|| profile_of(user, &self.backup_avatar))
    }

    pub fn organization(
        &mut self,
        organization_id: u64,
        resources: &dyn ResourceStore,
    ) -> Result<&Organization, StoreError> {
        match self.organizations.entry(organization_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(resources.organization(organization_id)?)),
        }
    }
}

fn profile_of(user: &User, backup_avatar: &str) -> AuthorProfile {
    let avatar_url = user
        .profile_image
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(backup_avatar)
        .to_string();
    AuthorProfile {
        name: user.name.clone(),
        avatar_url,
        brand_color: user.brand_color.clone(),
    }
}
