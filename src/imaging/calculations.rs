//! Pure calculation functions for image dimensions and card layout.
//!
//! All functions here are pure and testable without any I/O or images.

/// Social card canvas, matching the background template.
pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 500;

/// Logo and avatar are both drawn into 64×64 boxes.
pub const BADGE_SIZE: u32 = 64;

/// Subforem logo: top-right corner.
pub const LOGO_POSITION: (i64, i64) = (856, 40);
pub const LOGO_BORDER_WIDTH: u32 = 4;

/// Author avatar: bottom-left corner.
pub const AVATAR_POSITION: (i64, i64) = (80, 376);

/// Title block: left-aligned, vertically centered slightly above the middle.
pub const TITLE_ORIGIN: (i64, i64) = (80, 211);

/// Author name and date sit to the right of the avatar.
pub const AUTHOR_ORIGIN: (i64, i64) = (164, 378);
pub const AUTHOR_POINT_SIZE: f32 = 30.0;
pub const DATE_ORIGIN: (i64, i64) = (164, 414);
pub const DATE_POINT_SIZE: f32 = 24.0;

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = (h as f64 * src_aspect).round() as u32;
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = (w as f64 / src_aspect).round() as u32;
        (w, h)
    }
}

/// Calculate dimensions that fit inside a box while keeping aspect ratio.
///
/// The inverse of [`calculate_fill_dimensions`]: one dimension matches the
/// box, the other is smaller or equal. Never returns a zero dimension.
pub fn calculate_contain_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).max(1);
    let h = ((src_h as f64 * scale).round() as u32).max(1);
    (w.min(tgt_w), h.min(tgt_h))
}

/// Top-left offset that centers `inner` inside `outer`.
///
/// Negative when `inner` is larger, which is what a center crop needs.
pub fn center_offset(outer: (u32, u32), inner: (u32, u32)) -> (i64, i64) {
    (
        (outer.0 as i64 - inner.0 as i64) / 2,
        (outer.1 as i64 - inner.1 as i64) / 2,
    )
}

/// Vertical start of a text block of `line_count` lines anchored at its center.
pub fn centered_block_top(center_y: i64, line_count: usize, line_height: f32) -> i64 {
    let block = line_count as f32 * line_height;
    (center_y as f32 - block / 2.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_banner() {
        // 2000x600 → 1000x500: height matches, width = 500 * (10/3) = 1667
        assert_eq!(
            calculate_fill_dimensions((2000, 600), (1000, 500)),
            (1667, 500)
        );
    }

    #[test]
    fn fill_taller_source_to_banner() {
        // 800x800 → 1000x500: width matches, height = 1000
        assert_eq!(
            calculate_fill_dimensions((800, 800), (1000, 500)),
            (1000, 1000)
        );
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(
            calculate_fill_dimensions((2000, 1000), (1000, 500)),
            (1000, 500)
        );
    }

    // =========================================================================
    // calculate_contain_dimensions tests
    // =========================================================================

    #[test]
    fn contain_square_into_square() {
        assert_eq!(calculate_contain_dimensions((512, 512), (64, 64)), (64, 64));
    }

    #[test]
    fn contain_wide_logo() {
        // 400x100 into 100x100 → 100x25
        assert_eq!(
            calculate_contain_dimensions((400, 100), (100, 100)),
            (100, 25)
        );
    }

    #[test]
    fn contain_upscales_small_source() {
        assert_eq!(
            calculate_contain_dimensions((50, 100), (300, 300)),
            (150, 300)
        );
    }

    #[test]
    fn contain_never_returns_zero() {
        assert_eq!(calculate_contain_dimensions((10_000, 1), (64, 64)), (64, 1));
    }

    // =========================================================================
    // offsets
    // =========================================================================

    #[test]
    fn center_offset_for_overlay() {
        // 300x300 logo on the 1000x500 canvas
        assert_eq!(center_offset((1000, 500), (300, 300)), (350, 100));
    }

    #[test]
    fn center_offset_negative_for_crop() {
        // 1667x500 fill result cropped to 1000x500
        assert_eq!(center_offset((1000, 500), (1667, 500)), (-333, 0));
    }

    #[test]
    fn centered_block_top_three_lines() {
        assert_eq!(centered_block_top(211, 3, 60.0), 121);
        assert_eq!(centered_block_top(211, 1, 88.0), 167);
    }

    #[test]
    fn layout_fits_canvas() {
        assert!(LOGO_POSITION.0 + BADGE_SIZE as i64 <= CANVAS_WIDTH as i64);
        assert!(AVATAR_POSITION.1 + BADGE_SIZE as i64 <= CANVAS_HEIGHT as i64);
    }
}
