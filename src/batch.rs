//! Batch social image generation for a user, organization or article.
//!
//! A batch run expands a [`Resource`] into the articles that should get a
//! generated image, then renders each one through the
//! [`SocialImageBuilder`]. The generator owns the run's [`LogoCache`] and
//! [`AuthorCache`], so consecutive articles from the same subforem and
//! author share lookups. A new generator starts with cold caches.
//!
//! ## Which articles qualify
//!
//! | Resource | Articles |
//! |---|---|
//! | Article | itself |
//! | User | the user's articles with no organization and no main image |
//! | Organization | the organization's articles with no main image |
//!
//! Articles are processed in ascending id order.
//!
//! A failing article never stops the run; it is reported by the builder and
//! counted in [`BatchReport::failed`].

use crate::cache::{AuthorCache, CacheStats, LogoCache};
use crate::imaging::ImageBackend;
use crate::services::{Services, StoreError};
use crate::social::{SocialImageBuilder, SocialImageRequest};
use crate::types::{Article, ImageTarget, Resource, User};
use tracing::{error, info};

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub generated: Vec<(ImageTarget, String)>,
    pub failed: Vec<ImageTarget>,
    /// Set when the qualifying articles could not be listed.
    pub listing_error: Option<String>,
    pub logo_stats: CacheStats,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.listing_error.is_none()
    }
}

pub struct BatchSocialImageGenerator<'a, B: ImageBackend> {
    builder: SocialImageBuilder<'a, B>,
    services: Services<'a>,
    logos: LogoCache,
    authors: AuthorCache,
}

impl<'a, B: ImageBackend> BatchSocialImageGenerator<'a, B> {
    pub fn new(builder: SocialImageBuilder<'a, B>, services: Services<'a>, backup_avatar: &str) -> Self {
        Self {
            builder,
            logos: LogoCache::new(services.subforems.default_id()),
            authors: AuthorCache::new(backup_avatar),
            services,
        }
    }

    /// Generate social images for every qualifying article of `resource`.
    pub fn generate(&mut self, resource: &Resource) -> BatchReport {
        let mut report = BatchReport::default();

        match self.qualifying_articles(resource) {
            Ok(articles) => {
                info!(
                    kind = resource.kind(),
                    id = resource.id(),
                    title = resource.title(),
                    articles = articles.len(),
                    "generating social images"
                );
                for article in &articles {
                    self.render(SocialImageRequest::Article(article), &mut report);
                }
            }
            Err(err) => {
                error!(
                    kind = resource.kind(),
                    id = resource.id(),
                    error = %err,
                    "failed to list articles"
                );
                self.services.reporter.notify(&err);
                report.listing_error = Some(err.to_string());
            }
        }

        report.logo_stats = self.logos.stats();
        report
    }

    /// Generate the profile social image of `user`.
    pub fn generate_profile(&mut self, user: &User) -> BatchReport {
        let mut report = BatchReport::default();
        self.render(SocialImageRequest::Profile(user), &mut report);
        report.logo_stats = self.logos.stats();
        report
    }

    fn render(&mut self, request: SocialImageRequest<'_>, report: &mut BatchReport) {
        let target = request.target();
        match self
            .builder
            .generate(request, &mut self.logos, &mut self.authors)
        {
            Some(url) => report.generated.push((target, url)),
            None => report.failed.push(target),
        }
    }

    fn qualifying_articles(&self, resource: &Resource) -> Result<Vec<Article>, StoreError> {
        let resources = self.services.resources;
        let mut articles = match resource {
            Resource::Article(article) => return Ok(vec![article.clone()]),
            Resource::User(user) => {
                let mut articles = resources.articles_by_user(user.id)?;
                articles.retain(|a| a.organization_id.is_none());
                articles
            }
            Resource::Organization(organization) => {
                resources.articles_by_organization(organization.id)?
            }
        };
        articles.retain(|a| !a.has_main_image());
        articles.sort_by_key(|a| a.id);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockBackend;
    use crate::imaging::{CardAssets, ImageSource};
    use crate::test_helpers::*;
    use crate::types::SubforemId;

    const A: SubforemId = SubforemId(1);
    const B: SubforemId = SubforemId(2);

    fn fixture() -> Fixture {
        let mut fixture = Fixture::new();
        fixture
            .store
            .logos
            .insert(A, "https://cdn.example.com/a.png".into());
        fixture
            .store
            .logos
            .insert(B, "https://cdn.example.com/b.png".into());
        fixture.store.users.push(user(10, "Ada", None));
        fixture.store.organizations.push(organization(20, None));
        fixture
    }

    fn generator<'a>(
        backend: &'a MockBackend,
        fixture: &'a Fixture,
    ) -> BatchSocialImageGenerator<'a, MockBackend> {
        let assets = CardAssets {
            template: ImageSource::parse("template.png"),
            rounded_mask: ImageSource::parse("mask.png"),
            font: None,
        };
        let builder = SocialImageBuilder::new(backend, fixture.services(), assets, "#000000");
        BatchSocialImageGenerator::new(builder, fixture.services(), "backup.png")
    }

    fn targets(report: &BatchReport) -> Vec<ImageTarget> {
        report.generated.iter().map(|(t, _)| *t).collect()
    }

    #[test]
    fn article_resource_renders_itself() {
        let fixture = fixture();
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        // Even with a main image: an explicit article is always rendered
        let mut a = article(100, "Hello", 10);
        a.main_image = Some("https://example.com/cover.png".into());
        let report = batch.generate(&Resource::Article(a));

        assert_eq!(targets(&report), vec![ImageTarget::Article(100)]);
        assert!(report.is_success());
    }

    #[test]
    fn organization_end_to_end() {
        let mut fixture = fixture();
        let mut a = article(100, "Org post", 10);
        a.organization_id = Some(20);
        fixture.store.articles.push(a);
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::Organization(organization(20, None)));

        assert_eq!(backend.compose_count(), 1);
        assert_eq!(
            *fixture.store.article_writes.borrow(),
            vec![(100, "https://cdn.example.com/uploads/1.png".to_string())]
        );
        assert_eq!(targets(&report), vec![ImageTarget::Article(100)]);
    }

    #[test]
    fn organization_skips_articles_with_main_image() {
        let mut fixture = fixture();
        for (id, cover) in [(103, None), (101, Some("https://example.com/c.png")), (102, None)] {
            let mut a = article(id, "Post", 10);
            a.organization_id = Some(20);
            a.main_image = cover.map(str::to_string);
            fixture.store.articles.push(a);
        }
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::Organization(organization(20, None)));

        assert_eq!(
            targets(&report),
            vec![ImageTarget::Article(102), ImageTarget::Article(103)]
        );
    }

    #[test]
    fn user_batch_skips_organization_and_cover_articles() {
        let mut fixture = fixture();
        let mut org_post = article(101, "Org post", 10);
        org_post.organization_id = Some(20);
        let mut covered = article(102, "Covered", 10);
        covered.main_image = Some("https://example.com/c.png".into());
        fixture.store.articles.extend([
            article(104, "Later", 10),
            org_post,
            covered,
            article(100, "Earlier", 10),
            article(105, "Someone else", 11),
        ]);
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::User(user(10, "Ada", None)));

        assert_eq!(
            targets(&report),
            vec![ImageTarget::Article(100), ImageTarget::Article(104)]
        );
        // Author resolved once for the whole batch
        assert_eq!(*fixture.store.user_lookups.borrow(), vec![10]);
    }

    #[test]
    fn logo_looked_up_once_per_subforem_run() {
        let mut fixture = fixture();
        for (id, subforem) in [(1, A), (2, A), (3, A), (4, B), (5, A)] {
            let mut a = article(id, "Post", 10);
            a.subforem_id = Some(subforem);
            fixture.store.articles.push(a);
        }
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::User(user(10, "Ada", None)));

        assert_eq!(report.generated.len(), 5);
        assert_eq!(*fixture.store.logo_lookups.borrow(), vec![A, B, A]);
        assert_eq!(report.logo_stats.lookups, 3);
        assert_eq!(report.logo_stats.reused, 2);
    }

    #[test]
    fn failing_article_does_not_stop_batch() {
        let mut fixture = fixture();
        fixture.store.failing_article_save = Some(2);
        fixture
            .store
            .articles
            .extend([article(1, "One", 10), article(2, "Two", 10), article(3, "Three", 10)]);
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::User(user(10, "Ada", None)));

        assert_eq!(
            targets(&report),
            vec![ImageTarget::Article(1), ImageTarget::Article(3)]
        );
        assert_eq!(report.failed, vec![ImageTarget::Article(2)]);
        assert!(!report.is_success());
        assert_eq!(fixture.reporter.errors.borrow().len(), 1);
        // The failure did not disturb the logo slot
        assert_eq!(fixture.store.logo_lookups.borrow().len(), 1);
    }

    #[test]
    fn logo_lookup_failure_skips_only_that_subforem() {
        let mut fixture = fixture();
        fixture.store.failing_logo = Some(A);
        for (id, subforem) in [(1, A), (2, B), (3, B)] {
            let mut a = article(id, "Post", 10);
            a.subforem_id = Some(subforem);
            fixture.store.articles.push(a);
        }
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::User(user(10, "Ada", None)));

        assert_eq!(report.failed, vec![ImageTarget::Article(1)]);
        assert_eq!(
            targets(&report),
            vec![ImageTarget::Article(2), ImageTarget::Article(3)]
        );
        assert_eq!(backend.compose_count(), 2);
        let written: Vec<_> = fixture
            .store
            .article_writes
            .borrow()
            .iter()
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(written, vec![2, 3]);
        assert_eq!(
            *fixture.reporter.errors.borrow(),
            vec!["settings unavailable".to_string()]
        );
        // The failed lookup left the slot empty; B is looked up once
        assert_eq!(*fixture.store.logo_lookups.borrow(), vec![A, B]);
    }

    #[test]
    fn compose_failure_keeps_cache_warm() {
        let mut fixture = fixture();
        fixture.store.users.push(user(11, "Bob", Some("https://example.com/bob.png")));
        let backend = MockBackend::failing_on("https://example.com/bob.png", "avatar gone");
        let mut batch = generator(&backend, &fixture);

        let mut report = batch.generate(&Resource::Article(article(1, "One", 10)));
        report.generated.extend(batch.generate(&Resource::Article(article(2, "Two", 11))).generated);
        report.generated.extend(batch.generate(&Resource::Article(article(3, "Three", 10))).generated);

        assert_eq!(
            targets(&report),
            vec![ImageTarget::Article(1), ImageTarget::Article(3)]
        );
        assert_eq!(fixture.store.logo_lookups.borrow().len(), 1);
        assert_eq!(
            *fixture.reporter.errors.borrow(),
            vec!["avatar gone".to_string()]
        );
    }

    #[test]
    fn listing_failure_is_reported() {
        let mut fixture = fixture();
        fixture.store.listing_error = Some("database unavailable".into());
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate(&Resource::Organization(organization(20, None)));

        assert_eq!(report.listing_error.as_deref(), Some("database unavailable"));
        assert_eq!(backend.compose_count(), 0);
        assert_eq!(
            *fixture.reporter.errors.borrow(),
            vec!["database unavailable".to_string()]
        );
    }

    #[test]
    fn profile_generation() {
        let fixture = fixture();
        let backend = MockBackend::new();
        let mut batch = generator(&backend, &fixture);

        let report = batch.generate_profile(&user(10, "Ada", None));

        assert_eq!(targets(&report), vec![ImageTarget::Profile(10)]);
        assert_eq!(fixture.store.profile_writes.borrow().len(), 1);
    }

    #[test]
    fn new_generator_starts_cold() {
        let mut fixture = fixture();
        fixture.store.articles.push(article(1, "One", 10));
        let backend = MockBackend::new();

        generator(&backend, &fixture).generate(&Resource::User(user(10, "Ada", None)));
        generator(&backend, &fixture).generate(&Resource::User(user(10, "Ada", None)));

        assert_eq!(fixture.store.logo_lookups.borrow().len(), 2);
        assert_eq!(fixture.store.user_lookups.borrow().len(), 2);
    }
}
