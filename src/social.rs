//! Social image generation for one article or user profile.
//!
//! [`SocialImageBuilder::generate`] is the error boundary of the social
//! pipeline. It runs the whole sequence for one request:
//!
//! 1. **Resolve** the card: title, author, date, brand color, avatar.
//! 2. **Logo**: the subforem logo through the run's [`LogoCache`].
//! 3. **Plan** the layers ([`plan_social_card`]).
//! 4. **Render and upload** through a scoped temp file.
//! 5. **Persist** the URL and bust the page cache.
//!
//! Any failure along the way is logged, sent to the
//! [`ErrorReporter`](crate::services::ErrorReporter), and swallowed: the
//! resource keeps whatever social image it had before and the caller moves
//! on to the next one.
//!
//! Every call composes a fresh image from the template. Nothing is reused
//! between calls except the lookup caches.

use crate::cache::{AuthorCache, LogoCache};
use crate::imaging::{BackendError, CardAssets, ImageBackend, InvalidColor, plan_social_card};
use crate::services::{Services, StoreError};
use crate::text::format_date;
use crate::types::{Article, ImageTarget, SocialCard, User};
use crate::upload::{UploadError, render_and_store};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SocialImageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("bad brand color: {0}")]
    Color(#[from] InvalidColor),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// What to draw a social image for.
#[derive(Debug, Clone, Copy)]
pub enum SocialImageRequest<'r> {
    Article(&'r Article),
    Profile(&'r User),
}

impl SocialImageRequest<'_> {
    pub fn target(&self) -> ImageTarget {
        match self {
            SocialImageRequest::Article(article) => ImageTarget::Article(article.id),
            SocialImageRequest::Profile(user) => ImageTarget::Profile(user.id),
        }
    }
}

pub struct SocialImageBuilder<'a, B: ImageBackend> {
    backend: &'a B,
    services: Services<'a>,
    assets: CardAssets,
    default_brand_color: String,
}

impl<'a, B: ImageBackend> SocialImageBuilder<'a, B> {
    pub fn new(
        backend: &'a B,
        services: Services<'a>,
        assets: CardAssets,
        default_brand_color: &str,
    ) -> Self {
        Self {
            backend,
            services,
            assets,
            default_brand_color: default_brand_color.to_string(),
        }
    }

    /// Generate, upload and persist the image; returns its URL.
    ///
    /// Failures are reported and yield `None`.
    pub fn generate(
        &self,
        request: SocialImageRequest<'_>,
        logos: &mut LogoCache,
        authors: &mut AuthorCache,
    ) -> Option<String> {
        let target = request.target();
        match self.try_generate(request, logos, authors) {
            Ok(url) => {
                info!(%target, %url, "generated social image");
                Some(url)
            }
            Err(err) => {
                error!(%target, error = %err, "failed to generate social image");
                self.services.reporter.notify(&err);
                None
            }
        }
    }

    fn try_generate(
        &self,
        request: SocialImageRequest<'_>,
        logos: &mut LogoCache,
        authors: &mut AuthorCache,
    ) -> Result<String, SocialImageError> {
        let card = self.resolve_card(request, authors)?;
        let logo = logos.logo_for(card.subforem_id, self.services.settings)?;
        let plan = plan_social_card(&card, logo.as_deref(), &self.assets)?;

        let url = render_and_store(self.services.uploader, |path| {
            self.backend
                .compose(&plan, path)
                .map_err(SocialImageError::from)
        })?;

        match card.target {
            ImageTarget::Article(id) => self
                .services
                .resources
                .save_article_social_image(id, &url)?,
            ImageTarget::Profile(id) => self
                .services
                .resources
                .update_profile_social_image(id, &url)?,
        }
        self.services.cache_buster.bust(&card.target);
        Ok(url)
    }

    fn resolve_card(
        &self,
        request: SocialImageRequest<'_>,
        authors: &mut AuthorCache,
    ) -> Result<SocialCard, StoreError> {
        let resources = self.services.resources;
        match request {
            SocialImageRequest::Article(article) => {
                let author = authors.author(article.user_id, resources)?.clone();
                let (organization_color, organization_subforem) = match article.organization_id {
                    Some(id) => {
                        let organization = authors.organization(id, resources)?;
                        (organization.brand_color.clone(), organization.subforem_id)
                    }
                    None => (None, None),
                };
                Ok(SocialCard {
                    target: ImageTarget::Article(article.id),
                    title: article.title.clone(),
                    author_name: author.name,
                    date: article.published_at.as_ref().map(format_date),
                    brand_color: self.brand_color([organization_color, author.brand_color]),
                    subforem_id: article.subforem_id.or(organization_subforem),
                    avatar_url: author.avatar_url,
                })
            }
            SocialImageRequest::Profile(user) => {
                let author = authors.author_of(user).clone();
                Ok(SocialCard {
                    target: ImageTarget::Profile(user.id),
                    title: author.name,
                    author_name: format!("@{}", user.username),
                    date: None,
                    brand_color: self.brand_color([author.brand_color]),
                    subforem_id: user.subforem_id,
                    avatar_url: author.avatar_url,
                })
            }
        }
    }

    /// First non-blank candidate, else the configured default.
    fn brand_color<const N: usize>(&self, candidates: [Option<String>; N]) -> String {
        candidates
            .into_iter()
            .flatten()
            .find(|color| !color.trim().is_empty())
            .unwrap_or_else(|| self.default_brand_color.clone())
    }
}
