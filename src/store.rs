//! JSON-file resource and settings store.
//!
//! A single JSON document stands in for the application database: subforem
//! settings, users, organizations and articles. The CLI loads it, runs one
//! pipeline against it, and writes it back.
//!
//! ```json
//! {
//!   "default_subforem_id": 1,
//!   "subforems": [{ "id": 1, "logo_png": "https://cdn.example.com/logo.png" }],
//!   "users": [{ "id": 10, "name": "Ada", "username": "ada" }],
//!   "organizations": [],
//!   "articles": [{ "id": 100, "title": "Hello", "user_id": 10 }]
//! }
//! ```
//!
//! Interior mutability (`RefCell`) lets one store serve every collaborator
//! trait through shared references; the pipelines are single-threaded.

use crate::services::{ResourceStore, SettingsStore, StoreError, SubforemDirectory};
use crate::types::{Article, Organization, SubforemId, User};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// Branding settings of one subforem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subforem {
    pub id: SubforemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resized_logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_social_image: Option<String>,
}

/// The whole store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    pub default_subforem_id: SubforemId,
    pub subforems: Vec<Subforem>,
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
    pub articles: Vec<Article>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            default_subforem_id: SubforemId(1),
            subforems: Vec::new(),
            users: Vec::new(),
            organizations: Vec::new(),
            articles: Vec::new(),
        }
    }
}

pub struct JsonStore {
    data: RefCell<StoreData>,
}

impl JsonStore {
    pub fn new(data: StoreData) -> Self {
        Self {
            data: RefCell::new(data),
        }
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&*self.data.borrow())?;
        fs::write(path, json)?;
        Ok(())
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> StoreData {
        self.data.borrow().clone()
    }

    pub fn article(&self, id: u64) -> Result<Article, StoreError> {
        self.data
            .borrow()
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "article",
                id,
            })
    }

    fn update_subforem(
        &self,
        subforem: SubforemId,
        update: impl FnOnce(&mut Subforem),
    ) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        let entry = data
            .subforems
            .iter_mut()
            .find(|s| s.id == subforem)
            .ok_or(StoreError::NotFound {
                kind: "subforem",
                id: subforem.0,
            })?;
        update(entry);
        Ok(())
    }
}

impl SettingsStore for JsonStore {
    fn logo_png(&self, subforem: SubforemId) -> Result<Option<String>, StoreError> {
        Ok(self
            .data
            .borrow()
            .subforems
            .iter()
            .find(|s| s.id == subforem)
            .and_then(|s| s.logo_png.clone()))
    }

    fn set_resized_logo(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.update_subforem(subforem, |s| s.resized_logo = Some(url.to_string()))
    }

    fn set_favicon_url(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.update_subforem(subforem, |s| s.favicon_url = Some(url.to_string()))
    }

    fn set_main_social_image(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.update_subforem(subforem, |s| s.main_social_image = Some(url.to_string()))
    }

    fn set_logo_png(&self, url: &str, subforem: SubforemId) -> Result<(), StoreError> {
        self.update_subforem(subforem, |s| s.logo_png = Some(url.to_string()))
    }
}

impl SubforemDirectory for JsonStore {
    fn default_id(&self) -> SubforemId {
        self.data.borrow().default_subforem_id
    }

    fn exists(&self, subforem: SubforemId) -> Result<bool, StoreError> {
        Ok(self.data.borrow().subforems.iter().any(|s| s.id == subforem))
    }
}

impl ResourceStore for JsonStore {
    fn user(&self, id: u64) -> Result<User, StoreError> {
        self.data
            .borrow()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "user", id })
    }

    fn organization(&self, id: u64) -> Result<Organization, StoreError> {
        self.data
            .borrow()
            .organizations
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "organization",
                id,
            })
    }

    fn articles_by_user(&self, user_id: u64) -> Result<Vec<Article>, StoreError> {
        Ok(self
            .data
            .borrow()
            .articles
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn articles_by_organization(&self, organization_id: u64) -> Result<Vec<Article>, StoreError> {
        Ok(self
            .data
            .borrow()
            .articles
            .iter()
            .filter(|a| a.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    fn save_article_social_image(&self, article_id: u64, url: &str) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        let article = data
            .articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound {
                kind: "article",
                id: article_id,
            })?;
        article.social_image = Some(url.to_string());
        Ok(())
    }

    fn update_profile_social_image(&self, user_id: u64, url: &str) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        let user = data
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound {
                kind: "user",
                id: user_id,
            })?;
        user.social_image = Some(url.to_string());
        Ok(())
    }
}
