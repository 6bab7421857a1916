//! Shared types used across the pipeline.
//!
//! Resources are the entities a social image is generated for. They are
//! deserialized from the [`JsonStore`](crate::store::JsonStore) document and
//! passed by reference through the batch driver, the social image builder and
//! the output formatter, so all three agree on one shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a subforem, the tenant/community partition that owns
/// branding (logo, favicon, main social image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubforemId(pub u64);

impl fmt::Display for SubforemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A published (or draft) article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub user_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    /// `None` falls back to the process-wide default subforem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subforem_id: Option<SubforemId>,
    /// Cover image. Articles with one are skipped by the batch driver.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Whether the article has a non-blank cover image.
    pub fn has_main_image(&self) -> bool {
        self.main_image
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

/// A user account. `social_image` is the profile social image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subforem_id: Option<SubforemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_image: Option<String>,
}

/// An organization. Its brand color and subforem apply to the articles it
/// owns unless the article sets its own subforem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subforem_id: Option<SubforemId>,
}

/// The entity a generation run is started for.
///
/// An article produces its own image; a user or organization fans out to
/// its qualifying articles (see [`batch`](crate::batch)).
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Article(Article),
    User(User),
    Organization(Organization),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Article(_) => "article",
            Resource::User(_) => "user",
            Resource::Organization(_) => "organization",
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Resource::Article(a) => a.id,
            Resource::User(u) => u.id,
            Resource::Organization(o) => o.id,
        }
    }

    /// Display title: the article title, or the user/organization name.
    pub fn title(&self) -> &str {
        match self {
            Resource::Article(a) => &a.title,
            Resource::User(u) => &u.name,
            Resource::Organization(o) => &o.name,
        }
    }
}

/// Where a generated image URL is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageTarget {
    /// `articles.social_image`, written through a regular save.
    Article(u64),
    /// The user profile's social image, written as a direct column update.
    Profile(u64),
}

impl fmt::Display for ImageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageTarget::Article(id) => write!(f, "article {id}"),
            ImageTarget::Profile(id) => write!(f, "profile {id}"),
        }
    }
}

/// Everything the builder needs to lay out one social image.
///
/// Resolved from a resource plus its author/organization, so the drawing
/// code never inspects which kind of resource it is rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialCard {
    pub target: ImageTarget,
    pub title: String,
    pub author_name: String,
    /// Pre-formatted publish date (`"Oct 16"`); `None` draws no date.
    pub date: Option<String>,
    pub brand_color: String,
    pub subforem_id: Option<SubforemId>,
    pub avatar_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: 7,
            title: "Hello".into(),
            user_id: 1,
            organization_id: None,
            subforem_id: None,
            main_image: None,
            social_image: None,
            published_at: None,
        }
    }

    #[test]
    fn blank_main_image_does_not_count() {
        let mut a = article();
        assert!(!a.has_main_image());
        a.main_image = Some("  ".into());
        assert!(!a.has_main_image());
        a.main_image = Some("https://example.com/cover.png".into());
        assert!(a.has_main_image());
    }

    #[test]
    fn parse_article_with_optional_fields_missing() {
        let json = r#"{"id": 3, "title": "T", "user_id": 9}"#;
        let a: Article = serde_json::from_str(json).unwrap();
        assert_eq!(a.id, 3);
        assert_eq!(a.subforem_id, None);
        assert_eq!(a.published_at, None);
    }

    #[test]
    fn parse_subforem_id_is_transparent() {
        let json = r#"{"id": 3, "title": "T", "user_id": 9, "subforem_id": 4}"#;
        let a: Article = serde_json::from_str(json).unwrap();
        assert_eq!(a.subforem_id, Some(SubforemId(4)));
    }

    #[test]
    fn resource_accessors() {
        let r = Resource::Article(article());
        assert_eq!(r.kind(), "article");
        assert_eq!(r.id(), 7);
        assert_eq!(r.title(), "Hello");
    }

    #[test]
    fn image_target_display() {
        assert_eq!(ImageTarget::Article(3).to_string(), "article 3");
        assert_eq!(ImageTarget::Profile(5).to_string(), "profile 5");
    }
}
