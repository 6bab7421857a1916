//! Parameter types for image operations.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the pipelines ([`social`](crate::social), [`branding`](crate::branding)),
//! which decide what an image should contain, and the
//! [`backend`](super::backend), which does the pixel work. This separation
//! allows swapping backends (e.g. for testing with a mock) without changing
//! layout logic.
//!
//! ## Types
//!
//! - [`ImageSource`]: a local file or an `http(s)://` URL.
//! - [`Color`]: RGBA parsed from `#rgb` / `#rrggbb`.
//! - [`ResizeParams`]: open a source and fit it inside a box.
//! - [`CompositionPlan`]: background + image layers + text layers.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid color: {0}")]
pub struct InvalidColor(pub String);

/// Where an input image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    File(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Interpret a string as a URL when it has an `http(s)://` scheme,
    /// otherwise as a filesystem path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ImageSource::Url(trimmed.to_string())
        } else {
            ImageSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::File(path) => write!(f, "{}", path.display()),
            ImageSource::Url(url) => f.write_str(url),
        }
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    /// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, InvalidColor> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || InvalidColor(hex.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Color([
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                255,
            ])),
            3 => {
                let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
                Ok(Color([expand(0)?, expand(1)?, expand(2)?, 255]))
            }
            _ => Err(invalid()),
        }
    }
}

/// How a layer is scaled into its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Fit inside the box, preserving aspect ratio (ImageMagick `WxH`).
    Contain,
    /// Fill the box and center-crop the overflow (`WxH^` + `-extent`).
    Cover,
}

/// Where a layer lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Top-left corner in canvas pixels.
    At { x: i64, y: i64 },
    /// Centered on the canvas.
    Center,
}

/// Stroked rectangle drawn around a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub color: Color,
    pub width: u32,
}

/// An image composited onto the background.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    pub fit: Fit,
    pub position: Position,
    /// Grayscale mask scaled to the layer; its luminance becomes alpha.
    pub mask: Option<ImageSource>,
    pub border: Option<Border>,
}

/// How a text block is anchored at its `(x, y)` point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// `(x, y)` is the top-left of the first line.
    TopLeft,
    /// `(x, y)` is the left edge of the block's vertical center.
    CenterLeft,
}

/// A (possibly multi-line) text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    /// Lines separated by `\n`.
    pub text: String,
    pub point_size: f32,
    pub x: i64,
    pub y: i64,
    pub anchor: TextAnchor,
    pub color: Color,
}

/// The base canvas of a composition.
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    /// Used as-is (the fixed social template).
    Template(ImageSource),
    /// Resized to cover `width × height`, then center-cropped to it.
    Cover {
        source: ImageSource,
        width: u32,
        height: u32,
    },
}

impl Background {
    pub fn source(&self) -> &ImageSource {
        match self {
            Background::Template(source) => source,
            Background::Cover { source, .. } => source,
        }
    }
}

/// Everything needed to compose one image.
///
/// Layers are drawn in order, then text blocks in order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    pub background: Background,
    pub layers: Vec<ImageLayer>,
    pub texts: Vec<TextLayer>,
    /// TrueType font for the text blocks.
    pub font: Option<PathBuf>,
}

/// Parameters for a plain resize (ImageMagick `resize "WxH"`).
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
}
