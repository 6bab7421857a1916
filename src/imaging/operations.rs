//! High-level image operations.
//!
//! These functions combine text layout and calculations into the parameter
//! types the backend executes. They decide *what* a social card or branding
//! image contains; nothing here opens a file.

use super::calculations::{
    AUTHOR_ORIGIN, AUTHOR_POINT_SIZE, AVATAR_POSITION, BADGE_SIZE, CANVAS_HEIGHT, CANVAS_WIDTH,
    DATE_ORIGIN, DATE_POINT_SIZE, LOGO_BORDER_WIDTH, LOGO_POSITION, TITLE_ORIGIN,
};
use super::params::{
    Background, Border, Color, CompositionPlan, Fit, ImageLayer, ImageSource, InvalidColor,
    Position, ResizeParams, TextAnchor, TextLayer,
};
use crate::text::{fill_color, font_size, truncate_title, wrap_text};
use crate::types::SocialCard;
use std::path::PathBuf;
use tracing::debug;

/// Static inputs shared by every social card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardAssets {
    pub template: ImageSource,
    pub rounded_mask: ImageSource,
    pub font: Option<PathBuf>,
}

/// Lay out a social card.
///
/// A missing or blank `logo_url` leaves the logo layer out entirely, so the
/// backend never tries to open it.
pub fn plan_social_card(
    card: &SocialCard,
    logo_url: Option<&str>,
    assets: &CardAssets,
) -> Result<CompositionPlan, InvalidColor> {
    let color = Color::from_hex(fill_color(&card.brand_color))?;

    let mut layers = Vec::with_capacity(2);
    match logo_url.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => layers.push(ImageLayer {
            source: ImageSource::parse(url),
            width: BADGE_SIZE,
            height: BADGE_SIZE,
            fit: Fit::Contain,
            position: Position::At {
                x: LOGO_POSITION.0,
                y: LOGO_POSITION.1,
            },
            mask: None,
            border: Some(Border {
                color: Color::WHITE,
                width: LOGO_BORDER_WIDTH,
            }),
        }),
        None => debug!(target = %card.target, "no subforem logo, skipping logo layer"),
    }
    layers.push(ImageLayer {
        source: ImageSource::parse(&card.avatar_url),
        width: BADGE_SIZE,
        height: BADGE_SIZE,
        fit: Fit::Cover,
        position: Position::At {
            x: AVATAR_POSITION.0,
            y: AVATAR_POSITION.1,
        },
        mask: Some(assets.rounded_mask.clone()),
        border: None,
    });

    let title = truncate_title(&card.title);
    let mut texts = vec![
        TextLayer {
            point_size: font_size(&title) as f32,
            text: wrap_text(&title),
            x: TITLE_ORIGIN.0,
            y: TITLE_ORIGIN.1,
            anchor: TextAnchor::CenterLeft,
            color,
        },
        TextLayer {
            text: card.author_name.clone(),
            point_size: AUTHOR_POINT_SIZE,
            x: AUTHOR_ORIGIN.0,
            y: AUTHOR_ORIGIN.1,
            anchor: TextAnchor::TopLeft,
            color,
        },
    ];
    if let Some(date) = &card.date {
        texts.push(TextLayer {
            text: date.clone(),
            point_size: DATE_POINT_SIZE,
            x: DATE_ORIGIN.0,
            y: DATE_ORIGIN.1,
            anchor: TextAnchor::TopLeft,
            color,
        });
    }

    Ok(CompositionPlan {
        background: Background::Template(assets.template.clone()),
        layers,
        texts,
        font: assets.font.clone(),
    })
}

/// Background for a branding social image: the custom image when given,
/// cover-fitted to the canvas, otherwise the stock template.
pub fn branding_background(template: &ImageSource, custom: Option<&str>) -> Background {
    match custom.map(str::trim).filter(|url| !url.is_empty()) {
        Some(url) => Background::Cover {
            source: ImageSource::parse(url),
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        },
        None => Background::Template(template.clone()),
    }
}

/// A square logo centered on `background`.
pub fn plan_centered_logo(logo: &ImageSource, size: u32, background: Background) -> CompositionPlan {
    CompositionPlan {
        background,
        layers: vec![ImageLayer {
            source: logo.clone(),
            width: size,
            height: size,
            fit: Fit::Contain,
            position: Position::Center,
            mask: None,
            border: None,
        }],
        texts: vec![],
        font: None,
    }
}

/// Fit `source` inside a `size × size` square.
pub fn square_resize(source: &ImageSource, size: u32) -> ResizeParams {
    ResizeParams {
        source: source.clone(),
        width: size,
        height: size,
    }
}
