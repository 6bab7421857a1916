//! CLI output formatting for the generation commands.
//!
//! # Output Format
//!
//! ## Batch (article / user / organization / profile)
//!
//! ```text
//! organization 20: Analytical Engines
//! 001 article 101 → http://localhost:3000/uploads/3f1c….png
//! 002 article 102 failed
//! Generated 1 image, 1 failed; logos 1 looked up, 1 reused (2 total)
//! ```
//!
//! ## Branding
//!
//! ```text
//! subforem 3
//!     resized logo → http://localhost:3000/uploads/a91e….png
//!     favicon failed: Failed to generate favicon: Download failed
//! Generated 3 of 4 branding images
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::BatchReport;
use crate::branding::{BrandingReport, BrandingStep};
use crate::types::ImageTarget;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// Format a batch run. `heading` names what the run was started for
/// (e.g. `"organization 20: Analytical Engines"`).
pub fn format_batch_report(heading: &str, report: &BatchReport) -> Vec<String> {
    let mut lines = vec![heading.to_string()];

    if let Some(err) = &report.listing_error {
        lines.push(format!("{}Could not list articles: {}", indent(1), err));
        return lines;
    }

    let mut entries: Vec<(ImageTarget, Option<&str>)> = report
        .generated
        .iter()
        .map(|(target, url)| (*target, Some(url.as_str())))
        .chain(report.failed.iter().map(|target| (*target, None)))
        .collect();
    entries.sort_by_key(|(target, _)| *target);

    for (i, (target, url)) in entries.iter().enumerate() {
        match url {
            Some(url) => lines.push(format!("{} {} → {}", format_index(i + 1), target, url)),
            None => lines.push(format!("{} {} failed", format_index(i + 1), target)),
        }
    }

    let mut summary = format!("Generated {}", plural(report.generated.len(), "image"));
    if !report.failed.is_empty() {
        summary.push_str(&format!(", {} failed", report.failed.len()));
    }
    if report.logo_stats.total() > 0 {
        summary.push_str(&format!("; logos {}", report.logo_stats));
    }
    lines.push(summary);
    lines
}

/// Print batch output to stdout.
pub fn print_batch_report(heading: &str, report: &BatchReport) {
    for line in format_batch_report(heading, report) {
        println!("{}", line);
    }
}

// ============================================================================
// Branding output
// ============================================================================

/// Format a branding run, one line per step in run order.
pub fn format_branding_report(report: &BrandingReport) -> Vec<String> {
    let mut lines = vec![format!("subforem {}", report.subforem)];

    for step in BrandingStep::ALL {
        if let Some((_, url)) = report.generated.iter().find(|(s, _)| *s == step) {
            lines.push(format!("{}{} → {}", indent(1), step, url));
        } else if let Some((_, message)) = report.failed.iter().find(|(s, _)| *s == step) {
            lines.push(format!("{}{} failed: {}", indent(1), step, message));
        }
    }

    lines.push(format!(
        "Generated {} of {} branding images",
        report.generated.len(),
        BrandingStep::ALL.len()
    ));
    lines
}

/// Print branding output to stdout.
pub fn print_branding_report(report: &BrandingReport) {
    for line in format_branding_report(report) {
        println!("{}", line);
    }
}
