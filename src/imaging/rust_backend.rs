//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Fetch `http(s)://` sources | `reqwest` blocking client with a timeout |
//! | Resize | `image::DynamicImage::resize` with `Lanczos3` filter |
//! | Cover background | resize to fill + `imageops::crop_imm` |
//! | Composite | `image::imageops::overlay` |
//! | Text | `rusttype` glyph rasterisation, alpha-blended |
//! | Encode | PNG |

use super::backend::{BackendError, ImageBackend};
use super::calculations::{
    calculate_contain_dimensions, calculate_fill_dimensions, center_offset, centered_block_top,
};
use super::params::{
    Background, Border, Color, CompositionPlan, Fit, ImageLayer, ImageSource, Position,
    ResizeParams, TextAnchor, TextLayer,
};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    client: reqwest::blocking::Client,
    /// Parsed fonts by path; a batch draws every card with the same font.
    fonts: Mutex<HashMap<PathBuf, Arc<Font<'static>>>>,
}

impl RustBackend {
    pub fn new(fetch_timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(concat!("social-images/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            fonts: Mutex::new(HashMap::new()),
        })
    }

    /// Load and decode an image from disk or over HTTP.
    fn load_image(&self, source: &ImageSource) -> Result<DynamicImage, BackendError> {
        match source {
            ImageSource::File(path) => ImageReader::open(path)?
                .with_guessed_format()?
                .decode()
                .map_err(|e| {
                    BackendError::ProcessingFailed(format!(
                        "Failed to decode {}: {}",
                        path.display(),
                        e
                    ))
                }),
            ImageSource::Url(url) => {
                let bytes = self.fetch(url)?;
                image::load_from_memory(&bytes).map_err(|e| {
                    BackendError::ProcessingFailed(format!("Failed to decode {url}: {e}"))
                })
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let fail = |reason: String| BackendError::Fetch {
            url: url.to_string(),
            reason,
        };
        debug!(url, "fetching image");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fail(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("HTTP {status}")));
        }
        let bytes = response.bytes().map_err(|e| fail(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn font(&self, path: &Path) -> Result<Arc<Font<'static>>, BackendError> {
        let mut fonts = self
            .fonts
            .lock()
            .map_err(|_| BackendError::ProcessingFailed("font cache poisoned".into()))?;
        if let Some(font) = fonts.get(path) {
            return Ok(Arc::clone(font));
        }
        let data = std::fs::read(path)?;
        let font = Font::try_from_vec(data).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("Invalid font file: {}", path.display()))
        })?;
        let font = Arc::new(font);
        fonts.insert(path.to_path_buf(), Arc::clone(&font));
        Ok(font)
    }

    fn render_background(&self, background: &Background) -> Result<RgbaImage, BackendError> {
        match background {
            Background::Template(source) => Ok(self.load_image(source)?.to_rgba8()),
            Background::Cover {
                source,
                width,
                height,
            } => Ok(cover(&self.load_image(source)?, *width, *height)),
        }
    }

    fn render_layer(&self, layer: &ImageLayer) -> Result<RgbaImage, BackendError> {
        let img = self.load_image(&layer.source)?;
        let mut rendered = match layer.fit {
            Fit::Contain => {
                let (w, h) =
                    calculate_contain_dimensions(img.dimensions(), (layer.width, layer.height));
                img.resize_exact(w, h, FilterType::Lanczos3).to_rgba8()
            }
            Fit::Cover => cover(&img, layer.width, layer.height),
        };
        if let Some(mask) = &layer.mask {
            apply_mask(&mut rendered, &self.load_image(mask)?);
        }
        if let Some(border) = layer.border {
            draw_border(&mut rendered, border);
        }
        Ok(rendered)
    }
}

/// Fill-resize then center-crop to exact dimensions.
fn cover(img: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let (fill_w, fill_h) = calculate_fill_dimensions(img.dimensions(), (width, height));
    let filled = img
        .resize_exact(fill_w, fill_h, FilterType::Lanczos3)
        .to_rgba8();
    let (dx, dy) = center_offset((fill_w, fill_h), (width, height));
    imageops::crop_imm(&filled, dx.max(0) as u32, dy.max(0) as u32, width, height).to_image()
}

/// Multiply the layer's alpha by the mask's luminance.
fn apply_mask(layer: &mut RgbaImage, mask: &DynamicImage) {
    let mask = mask
        .resize_exact(layer.width(), layer.height(), FilterType::Triangle)
        .to_luma8();
    for (x, y, pixel) in layer.enumerate_pixels_mut() {
        let coverage = mask.get_pixel(x, y).0[0] as u32;
        pixel.0[3] = (pixel.0[3] as u32 * coverage / 255) as u8;
    }
}

/// Stroke a rectangle just inside the layer's edges.
fn draw_border(layer: &mut RgbaImage, border: Border) {
    let (w, h) = layer.dimensions();
    let stroke = border.width.min(w / 2).min(h / 2);
    for (x, y, pixel) in layer.enumerate_pixels_mut() {
        if x < stroke || y < stroke || x >= w - stroke || y >= h - stroke {
            *pixel = Rgba(border.color.0);
        }
    }
}

fn draw_text(canvas: &mut RgbaImage, font: &Font<'static>, layer: &TextLayer) {
    let scale = Scale::uniform(layer.point_size);
    let v_metrics = font.v_metrics(scale);
    let line_height = v_metrics.ascent - v_metrics.descent + v_metrics.line_gap;
    let lines: Vec<&str> = layer.text.lines().collect();
    let top = match layer.anchor {
        TextAnchor::TopLeft => layer.y,
        TextAnchor::CenterLeft => centered_block_top(layer.y, lines.len(), line_height),
    };

    for (i, line) in lines.iter().enumerate() {
        let baseline = top as f32 + i as f32 * line_height + v_metrics.ascent;
        for glyph in font.layout(line, scale, point(layer.x as f32, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                if px >= canvas.width() || py >= canvas.height() {
                    return;
                }
                blend(canvas.get_pixel_mut(px, py), layer.color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, color: Color, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * color.0[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }
    let inv = 1.0 - alpha;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * alpha + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * alpha + dst.0[3] as f32 * inv).round() as u8;
}

fn save_png(img: &RgbaImage, path: &Path) -> Result<(), BackendError> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn resize(&self, params: &ResizeParams, output: &Path) -> Result<(), BackendError> {
        let img = self.load_image(&params.source)?;
        let resized = img.resize(params.width, params.height, FilterType::Lanczos3);
        save_png(&resized.to_rgba8(), output)
    }

    fn compose(&self, plan: &CompositionPlan, output: &Path) -> Result<(), BackendError> {
        let mut canvas = self.render_background(&plan.background)?;
        let canvas_dims = canvas.dimensions();

        for layer in &plan.layers {
            let rendered = self.render_layer(layer)?;
            let (x, y) = match layer.position {
                Position::At { x, y } => (x, y),
                Position::Center => center_offset(canvas_dims, rendered.dimensions()),
            };
            imageops::overlay(&mut canvas, &rendered, x, y);
        }

        if !plan.texts.is_empty() {
            match &plan.font {
                Some(path) => {
                    let font = self.font(path)?;
                    for text in &plan.texts {
                        draw_text(&mut canvas, &font, text);
                    }
                }
                None => warn!(
                    layers = plan.texts.len(),
                    "no font configured, skipping text layers"
                ),
            }
        }

        save_png(&canvas, output)
    }
}
