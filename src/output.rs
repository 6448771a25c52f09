//! CLI output formatting for builds, watching, and post scaffolding.
//!
//! # Information-First Display
//!
//! Output reads as a content inventory: every artifact leads with its
//! positional index and title, followed by `→` and the output path relative
//! to the output root.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Static
//!     style.css
//!     images
//!
//! Pages
//! 001 index → index.html
//! 002 about → about.html
//!
//! Posts
//! 001 Hello → blog/Hello.html
//!     Draft: Idea.md
//!
//! Index
//!     Blog → blog/index.html
//!
//! Built 2 pages, 1 post in 4ms → output
//! ```
//!
//! ## Watch
//!
//! ```text
//! Watching /home/me/site (14 paths)
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::build::{Artifact, BuildReport};
use crate::watch::SyncSummary;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 About → about.html`
fn artifact_line(pos: usize, artifact: &Artifact) -> String {
    format!(
        "{} {} \u{2192} {}",
        format_index(pos),
        artifact.title,
        artifact.output
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of one build.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.static_entries.is_empty() {
        lines.push("Static".to_string());
        for entry in &report.static_entries {
            lines.push(format!("{}{}", indent(1), entry));
        }
        lines.push(String::new());
    }

    lines.push("Pages".to_string());
    for (i, page) in report.pages.iter().enumerate() {
        lines.push(artifact_line(i + 1, page));
    }
    lines.push(String::new());

    if !report.posts.is_empty() || !report.drafts.is_empty() {
        lines.push("Posts".to_string());
        for (i, post) in report.posts.iter().enumerate() {
            lines.push(artifact_line(i + 1, post));
        }
        for draft in &report.drafts {
            lines.push(format!("{}Draft: {}", indent(1), draft));
        }
        lines.push(String::new());
    }

    lines.push("Index".to_string());
    lines.push(format!(
        "{}{} \u{2192} {}",
        indent(1),
        report.index.title,
        report.index.output
    ));
    lines.push(String::new());

    lines.push(format!(
        "Built {}, {} in {}ms \u{2192} {}",
        plural(report.pages.len(), "page"),
        plural(report.posts.len(), "post"),
        report.duration.as_millis(),
        report.output_dir.display()
    ));

    lines
}

/// Print a build report to stdout.
pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Watch
// ============================================================================

pub fn format_watch_summary(root: &Path, summary: &SyncSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Watching {} ({})",
        root.display(),
        plural(summary.registered, "path")
    )];
    if summary.skipped > 0 {
        lines.push(format!(
            "{}{} could not be watched",
            indent(1),
            plural(summary.skipped, "path")
        ));
    }
    lines
}

pub fn print_watch_summary(root: &Path, summary: &SyncSummary) {
    for line in format_watch_summary(root, summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Post
// ============================================================================

pub fn format_new_post(path: &Path) -> Vec<String> {
    vec![format!("Created draft {}", path.display())]
}

pub fn print_new_post(path: &Path) {
    for line in format_new_post(path) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
