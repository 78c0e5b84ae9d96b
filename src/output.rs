//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every entity
//! (category, item) leads with its positional index and title; the output
//! path follows an arrow as secondary context. The summaries read as an
//! inventory of the directory while still pointing at the files written.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Source: https://api.publicapis.org/entries
//!     1425 records, 1419 valid, 1402 unique
//! Saved data/database.json
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! 001 Animals (2 APIs) → category/animals.html
//!     001 Cat Facts → api/cat-facts.html
//!     002 Dog API → api/dog-api.html
//! 002 Weather (1 API) → category/weather.html
//!     001 OpenWeatherMap → api/openweathermap.html
//! Error page → 404.html
//!
//! Assets
//!     css/
//!     ads.txt
//!
//! Generated 3 item pages, 2 category pages (7 pages total)
//! ```
//!
//! ## Sitemap
//!
//! ```text
//! Sitemap: 6 URLs → dist/sitemap.xml
//! Robots: dist/robots.txt
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use std::path::Path;

use crate::categorize::categorize;
use crate::fetch::FetchOutcome;
use crate::generate::{ERROR_PAGE, GenerateReport};
use crate::item::Item;
use crate::repository::duplicate_slugs;
use crate::sitemap::SitemapReport;
use crate::social::{DailyPost, PostOutcome};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 API`, `2 APIs`.
fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// First `max` characters of the first line, `...` if anything was cut.
fn preview(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let head: String = first_line.chars().take(max).collect();
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head
    }
}

// ============================================================================
// Stage formatters
// ============================================================================

/// Format fetch output.
pub fn format_fetch_output(outcome: &FetchOutcome, db_path: &Path) -> Vec<String> {
    match outcome {
        FetchOutcome::Saved {
            source,
            raw,
            valid,
            unique,
        } => vec![
            format!("Source: {source}"),
            format!("{}{raw} records, {valid} valid, {unique} unique", indent(1)),
            format!("Saved {}", db_path.display()),
        ],
        FetchOutcome::Skipped(reason) => vec![format!("Skipped: {reason}")],
    }
}

pub fn print_fetch_output(outcome: &FetchOutcome, db_path: &Path) {
    for line in format_fetch_output(outcome, db_path) {
        println!("{}", line);
    }
}

/// Format generate output.
///
/// Information-first: each category leads with its positional index, name
/// and item count, followed by `→` and the output path; its items follow
/// indented one level.
pub fn format_generate_output(report: &GenerateReport, item_noun: &str) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Home \u{2192} index.html".to_string());
    for (i, category) in report.categories.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}) \u{2192} {}",
            format_index(i + 1),
            category.name,
            count_noun(category.items.len(), item_noun),
            category.path
        ));
        for (j, (title, path)) in category.items.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(j + 1),
                title,
                path
            ));
        }
    }
    lines.push(format!("Error page \u{2192} {ERROR_PAGE}"));

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), asset));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} item pages, {} category pages ({} pages total)",
        report.item_pages,
        report.categories.len(),
        report.total_pages()
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport, item_noun: &str) {
    for line in format_generate_output(report, item_noun) {
        println!("{}", line);
    }
}

/// Format sitemap output. `None` means nothing was written.
pub fn format_sitemap_output(report: Option<&SitemapReport>) -> Vec<String> {
    let Some(report) = report else {
        return vec!["Sitemap: no pages found, nothing written".to_string()];
    };
    let mut lines = vec![format!(
        "Sitemap: {} URLs \u{2192} {}",
        report.url_count,
        report.sitemap_path.display()
    )];
    match &report.robots_path {
        Some(path) => lines.push(format!("Robots: {}", path.display())),
        None => lines.push("Robots: existing file kept".to_string()),
    }
    lines
}

pub fn print_sitemap_output(report: Option<&SitemapReport>) {
    for line in format_sitemap_output(report) {
        println!("{}", line);
    }
}

/// Format the daily post summary. `None` means the repository was empty.
pub fn format_post_output(post: Option<&DailyPost>) -> Vec<String> {
    let Some(post) = post else {
        return vec!["No items in repository; nothing to post".to_string()];
    };
    let mut lines = vec![
        format!("Selected: {} ({})", post.title, post.category),
        format!(
            "{}Preview ({} chars): {}",
            indent(1),
            post.message.chars().count(),
            preview(&post.message, 100)
        ),
    ];
    lines.push(match &post.outcome {
        PostOutcome::Posted { url: Some(url) } => format!("Posted \u{2192} {url}"),
        PostOutcome::Posted { url: None } => "Posted".to_string(),
        PostOutcome::Skipped => "Skipped: no access token configured".to_string(),
        PostOutcome::Failed(reason) => format!("Failed: {reason}"),
    });
    lines
}

pub fn print_post_output(post: Option<&DailyPost>) {
    for line in format_post_output(post) {
        println!("{}", line);
    }
}

/// Format the repository check: totals, categories with counts, duplicate
/// slugs.
pub fn format_check_output(items: &[Item], db_path: &Path, item_noun: &str) -> Vec<String> {
    let categories = categorize(items);
    let mut lines = vec![
        format!("Repository: {}", db_path.display()),
        format!(
            "{}{} in {} categories",
            indent(1),
            count_noun(items.len(), item_noun),
            categories.len()
        ),
    ];

    if !categories.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        for (i, summary) in categories.summaries().iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                summary.name,
                count_noun(summary.count, item_noun)
            ));
        }
    }

    let dupes = duplicate_slugs(items);
    lines.push(String::new());
    if dupes.is_empty() {
        lines.push("No duplicate slugs".to_string());
    } else {
        lines.push(format!("Duplicate slugs ({})", dupes.len()));
        for slug in dupes {
            lines.push(format!("{}{}", indent(1), slug));
        }
    }
    lines
}

pub fn print_check_output(items: &[Item], db_path: &Path, item_noun: &str) {
    for line in format_check_output(items, db_path, item_noun) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
