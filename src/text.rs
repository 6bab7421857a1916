//! Text layout heuristics for social images.
//!
//! Titles are drawn on a fixed 1000×500 canvas with no measuring pass, so
//! the layout is decided from character counts alone:
//!
//! | Title length | Point size | Wrap column |
//! |---|---|---|
//! | < 25 | 88 | none |
//! | 25–39 | 77 | none |
//! | 40–54 | 65 | 27 |
//! | 55–69 | 60 | 27 |
//! | 70 | 60 | 37 |
//! | > 70 | 50 | 37 |
//!
//! Titles longer than [`TITLE_MAX_CHARS`] are truncated *before* either
//! heuristic runs, so a truncated title always lands in the last row.
//!
//! All counts are in `char`s, not bytes; titles are user input and
//! routinely contain multi-byte characters.

use chrono::{DateTime, Utc};

/// Titles longer than this are cut and suffixed with an ellipsis.
pub const TITLE_MAX_CHARS: usize = 128;

const ELLIPSIS: &str = "...";

/// Pure black renders with artifacts in the compositor; it is swapped for
/// this near-black before drawing.
pub const OFF_BLACK: &str = "#111212";

/// Cut a title to [`TITLE_MAX_CHARS`] characters plus `"..."`.
///
/// Titles at or under the limit are returned unchanged.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(TITLE_MAX_CHARS).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Point size for a title, stepping down as the text grows.
pub fn font_size(text: &str) -> u32 {
    match text.chars().count() {
        0..25 => 88,
        25..40 => 77,
        40..55 => 65,
        55..=70 => 60,
        _ => 50,
    }
}

/// Wrap column for a title, or `None` when it fits on one line.
fn wrap_width(len: usize) -> Option<usize> {
    match len {
        0..40 => None,
        40..70 => Some(27),
        _ => Some(37),
    }
}

/// Word-wrap a title using the length-tiered column width.
///
/// Greedy: each line takes as many whole words as fit in the column. A word
/// longer than the column gets a line of its own rather than being split.
pub fn wrap_text(text: &str) -> String {
    let Some(width) = wrap_width(text.chars().count()) else {
        return text.to_string();
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}

/// Fill color for the text and accents drawn on a card.
pub fn fill_color(brand_color: &str) -> &str {
    if brand_color.trim().eq_ignore_ascii_case("#000000") {
        OFF_BLACK
    } else {
        brand_color
    }
}

/// Short publish date shown under the title, e.g. `"Oct 6"`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d").to_string()
}
