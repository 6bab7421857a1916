//! Subforem branding images.
//!
//! From one uploaded logo, a subforem gets four derived images, each written
//! to its own setting:
//!
//! | Step | Image | Setting |
//! |---|---|---|
//! | resized logo | logo fit in 100×100 | `resized_logo` |
//! | favicon | logo fit in 100×100 | `favicon_url` |
//! | main social image | logo 300×300 centered on the 1000×500 template or custom background | `main_social_image` |
//! | logo png | logo fit in 512×512 | `logo_png` |
//!
//! The steps are independent. A failing step is logged as
//! `Failed to generate <step>: <error>` and the rest still run, so an
//! unreachable logo produces four failures rather than one. Only a missing
//! subforem stops the run, before anything is fetched.

use crate::imaging::{
    BackendError, ImageBackend, ImageSource, branding_background, plan_centered_logo,
    square_resize,
};
use crate::services::{Services, StoreError};
use crate::types::SubforemId;
use crate::upload::{UploadError, render_and_store};
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

pub const RESIZED_LOGO_SIZE: u32 = 100;
pub const FAVICON_SIZE: u32 = 100;
pub const SOCIAL_LOGO_SIZE: u32 = 300;
pub const LOGO_PNG_SIZE: u32 = 512;

#[derive(Error, Debug)]
pub enum BrandingError {
    #[error("subforem {0} not found")]
    SubforemNotFound(SubforemId),
    #[error("failed to look up subforem: {0}")]
    Directory(#[from] StoreError),
}

/// Why a single step failed.
#[derive(Error, Debug)]
pub enum BrandingStepError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandingStep {
    ResizedLogo,
    Favicon,
    MainSocialImage,
    LogoPng,
}

impl BrandingStep {
    /// All steps, in the order they run.
    pub const ALL: [BrandingStep; 4] = [
        BrandingStep::ResizedLogo,
        BrandingStep::Favicon,
        BrandingStep::MainSocialImage,
        BrandingStep::LogoPng,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BrandingStep::ResizedLogo => "resized logo",
            BrandingStep::Favicon => "favicon",
            BrandingStep::MainSocialImage => "main social image",
            BrandingStep::LogoPng => "logo png",
        }
    }
}

impl fmt::Display for BrandingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one branding run.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandingReport {
    pub subforem: SubforemId,
    pub generated: Vec<(BrandingStep, String)>,
    /// Failed steps with their log message.
    pub failed: Vec<(BrandingStep, String)>,
}

pub struct SubforemBrandingGenerator<'a, B: ImageBackend> {
    backend: &'a B,
    services: Services<'a>,
    template: ImageSource,
}

impl<'a, B: ImageBackend> SubforemBrandingGenerator<'a, B> {
    pub fn new(backend: &'a B, services: Services<'a>, template: ImageSource) -> Self {
        Self {
            backend,
            services,
            template,
        }
    }

    /// Derive and store every branding image for `subforem` from `logo_url`.
    pub fn generate(
        &self,
        subforem: SubforemId,
        logo_url: &str,
        background_url: Option<&str>,
    ) -> Result<BrandingReport, BrandingError> {
        if !self.services.subforems.exists(subforem)? {
            return Err(BrandingError::SubforemNotFound(subforem));
        }

        let logo = ImageSource::parse(logo_url);
        let mut report = BrandingReport {
            subforem,
            generated: Vec::new(),
            failed: Vec::new(),
        };

        for step in BrandingStep::ALL {
            match self.run_step(step, subforem, &logo, background_url) {
                Ok(url) => {
                    info!(%subforem, %step, %url, "generated branding image");
                    report.generated.push((step, url));
                }
                Err(err) => {
                    let message = format!("Failed to generate {step}: {err}");
                    error!(%subforem, "{message}");
                    report.failed.push((step, message));
                }
            }
        }

        Ok(report)
    }

    fn run_step(
        &self,
        step: BrandingStep,
        subforem: SubforemId,
        logo: &ImageSource,
        background_url: Option<&str>,
    ) -> Result<String, BrandingStepError> {
        let url = render_and_store(self.services.uploader, |path| {
            let rendered = match step {
                BrandingStep::ResizedLogo => self
                    .backend
                    .resize(&square_resize(logo, RESIZED_LOGO_SIZE), path),
                BrandingStep::Favicon => self.backend.resize(&square_resize(logo, FAVICON_SIZE), path),
                BrandingStep::MainSocialImage => {
                    let background = branding_background(&self.template, background_url);
                    self.backend
                        .compose(&plan_centered_logo(logo, SOCIAL_LOGO_SIZE, background), path)
                }
                BrandingStep::LogoPng => self.backend.resize(&square_resize(logo, LOGO_PNG_SIZE), path),
            };
            rendered.map_err(BrandingStepError::from)
        })?;

        let settings = self.services.settings;
        match step {
            BrandingStep::ResizedLogo => settings.set_resized_logo(&url, subforem)?,
            BrandingStep::Favicon => settings.set_favicon_url(&url, subforem)?,
            BrandingStep::MainSocialImage => settings.set_main_social_image(&url, subforem)?,
            BrandingStep::LogoPng => settings.set_logo_png(&url, subforem)?,
        }
        Ok(url)
    }
}
