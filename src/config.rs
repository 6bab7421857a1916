//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are serialized to a TOML table, the user file is merged on top, and the
//! result is deserialized and validated.
//!
//! ## Config File Location
//!
//! `config.toml` is read from the directory passed as `--config` (the
//! current directory by default). Relative asset paths are resolved against
//! that directory.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [assets]
//! template = "assets/social-template.png"    # 1000x500 card background
//! rounded_mask = "assets/rounded-mask.png"   # avatar mask (white = visible)
//! # font = "assets/fonts/social.ttf"         # required for title/author/date text
//! backup_avatar = "https://assets.forem.com/backup-avatar.png"
//!
//! [social]
//! default_brand_color = "#000000"
//!
//! [upload]
//! directory = "uploads"
//! public_base_url = "http://localhost:3000/uploads"
//!
//! [fetch]
//! timeout_secs = 10
//!
//! [logging]
//! filter = "info"                          # overridden by RUST_LOG
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [social]
//! default_brand_color = "#3b49df"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{CardAssets, Color, ImageSource};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
///
/// Every field has a default, so a user file only lists what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Static images and font drawn onto every card.
    pub assets: AssetsConfig,
    /// Social card defaults.
    pub social: SocialConfig,
    /// Where uploaded images go and how they are addressed.
    pub upload: UploadConfig,
    /// Remote image fetching.
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Reject values the pipelines cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assets.template.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets.template must not be empty".into(),
            ));
        }
        if self.assets.rounded_mask.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets.rounded_mask must not be empty".into(),
            ));
        }
        if Color::from_hex(&self.social.default_brand_color).is_err() {
            return Err(ConfigError::Validation(format!(
                "social.default_brand_color must be a hex color, got {:?}",
                self.social.default_brand_color
            )));
        }
        if self.upload.directory.trim().is_empty() {
            return Err(ConfigError::Validation(
                "upload.directory must not be empty".into(),
            ));
        }
        if self.upload.public_base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "upload.public_base_url must not be empty".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Card assets with relative paths resolved against `base`.
    pub fn card_assets(&self, base: &Path) -> CardAssets {
        CardAssets {
            template: resolve_source(base, &self.assets.template),
            rounded_mask: resolve_source(base, &self.assets.rounded_mask),
            font: self.font().map(|font| base.join(font)),
        }
    }

    /// Whether social cards get their title, author and date text.
    /// Text needs `[assets].font`; the stock config has none.
    pub fn draws_text(&self) -> bool {
        self.font().is_some()
    }

    fn font(&self) -> Option<&str> {
        self.assets
            .font
            .as_deref()
            .map(str::trim)
            .filter(|font| !font.is_empty())
    }
}

/// URLs pass through; relative paths are joined onto `base`.
pub fn resolve_source(base: &Path, location: &str) -> ImageSource {
    match ImageSource::parse(location) {
        ImageSource::File(path) => ImageSource::File(base.join(path)),
        url => url,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub template: String,
    pub rounded_mask: String,
    /// Without a font, text layers are skipped.
    pub font: Option<String>,
    /// Avatar for users without a profile image.
    pub backup_avatar: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            template: "assets/social-template.png".into(),
            rounded_mask: "assets/rounded-mask.png".into(),
            font: None,
            backup_avatar: "https://assets.forem.com/backup-avatar.png".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialConfig {
    /// Used when neither the organization nor the author sets one.
    pub default_brand_color: String,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            default_brand_color: "#000000".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    pub directory: String,
    pub public_base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: "uploads".into(),
            public_base_url: "http://localhost:3000/uploads".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
        }
    }
}

/// `Config::default()` as a TOML table, the base layer user files merge onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Deep-merge `overlay` onto `base`.
///
/// Tables merge per key; any other overlay value replaces the base value.
/// Base keys absent from the overlay survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read `<path>/config.toml` without interpreting it. A missing file is
/// `Ok(None)`; malformed TOML is an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Apply `overlay` (if any) to `base`, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// The effective config for `root`: stock defaults overridden by
/// `root/config.toml` when present.
pub fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Commented stock `config.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Social Images Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Assets
# ---------------------------------------------------------------------------
[assets]
# 1000x500 background every social card is drawn on.
template = "assets/social-template.png"

# Grayscale mask applied to the 64x64 author avatar. White is visible.
rounded_mask = "assets/rounded-mask.png"

# TrueType font for title, author and date. REQUIRED FOR TEXT: without a
# font, cards carry only the template, logo and avatar, with no title,
# author name or date. Uncomment and point at a .ttf file to enable text.
# font = "assets/fonts/social.ttf"

# Avatar drawn for users without a profile image.
backup_avatar = "https://assets.forem.com/backup-avatar.png"

# ---------------------------------------------------------------------------
# Social cards
# ---------------------------------------------------------------------------
[social]
# Text color when neither the organization nor the author has a brand color.
# Pure black is drawn as #111212.
default_brand_color = "#000000"

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[upload]
# Directory generated images are copied into, named by content hash.
directory = "uploads"

# URL prefix the directory is served under.
public_base_url = "http://localhost:3000/uploads"

# ---------------------------------------------------------------------------
# Remote images
# ---------------------------------------------------------------------------
[fetch]
# Timeout for downloading logos, avatars and backgrounds.
timeout_secs = 10

# ---------------------------------------------------------------------------
# Logging
# ---------------------------------------------------------------------------
[logging]
# tracing filter directives, e.g. "info" or "social_images=debug".
# RUST_LOG takes precedence when set.
filter = "info"
"##
}
