//! Sitemap and robots.txt generation.
//!
//! Runs after a build and works from the output tree alone: every `.html`
//! file under the output directory becomes one `<url>` entry, except the
//! error document. Nothing about the item repository is consulted, so the
//! sitemap always matches what is actually deployed.
//!
//! ## Entry Attributes
//!
//! | page                    | changefreq | priority |
//! |-------------------------|------------|----------|
//! | `index.html`            | weekly     | 1.0      |
//! | `<category_path>/*.html`| weekly     | 0.8      |
//! | `<item_path>/*.html`    | monthly    | 0.6      |
//! | anything else           | monthly    | 0.5      |
//!
//! `robots.txt` is only written when the output does not already carry one
//! (for example one copied from the assets directory).

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::{DirectoryConfig, SiteConfig};
use crate::generate::ERROR_PAGE;

#[derive(Error, Debug)]
pub enum SitemapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to walk output directory: {0}")]
    Walk(#[from] walkdir::Error),
}

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// What [`generate_sitemap`] wrote.
#[derive(Debug)]
pub struct SitemapReport {
    pub sitemap_path: PathBuf,
    pub url_count: usize,
    /// `Some` when robots.txt was written by this run.
    pub robots_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Root,
    Category,
    Item,
    Other,
}

impl PageKind {
    /// Classify a relative page path against the output layout.
    pub fn of(rel_path: &str, layout: &DirectoryConfig) -> Self {
        if rel_path == "index.html" {
            return PageKind::Root;
        }
        match rel_path.split_once('/') {
            Some((dir, _)) if dir == layout.category_path => PageKind::Category,
            Some((dir, _)) if dir == layout.item_path => PageKind::Item,
            _ => PageKind::Other,
        }
    }

    pub fn changefreq(self) -> &'static str {
        match self {
            PageKind::Root | PageKind::Category => "weekly",
            PageKind::Item | PageKind::Other => "monthly",
        }
    }

    pub fn priority(self) -> &'static str {
        match self {
            PageKind::Root => "1.0",
            PageKind::Category => "0.8",
            PageKind::Item => "0.6",
            PageKind::Other => "0.5",
        }
    }
}

/// Every HTML page under `output_dir` except the error document, as sorted
/// `/`-separated relative paths.
pub fn collect_pages(output_dir: &Path) -> Result<Vec<String>, SitemapError> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(output_dir) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "html") {
            continue;
        }
        let Ok(rel) = path.strip_prefix(output_dir) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if rel == ERROR_PAGE {
            continue;
        }
        pages.push(rel);
    }
    pages.sort();
    Ok(pages)
}

/// Escape text for XML element content.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Absolute URL for a relative page path. The root page maps to `site_url/`.
pub fn page_url(site_url: &str, rel_path: &str) -> String {
    if rel_path == "index.html" {
        format!("{site_url}/")
    } else {
        format!("{site_url}/{rel_path}")
    }
}

/// Render the sitemap document.
pub fn build_sitemap_xml(
    pages: &[String],
    site_url: &str,
    lastmod: &str,
    layout: &DirectoryConfig,
) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NS}\">\n"));
    for page in pages {
        let kind = PageKind::of(page, layout);
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&page_url(site_url, page))
        ));
        xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", kind.changefreq()));
        xml.push_str(&format!("    <priority>{}</priority>\n", kind.priority()));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

pub fn build_robots_txt(site_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {site_url}/sitemap.xml\n")
}

/// Write `sitemap.xml` (and `robots.txt` if missing) into `output_dir`.
///
/// Returns `Ok(None)` without writing anything when the output holds no pages.
pub fn generate_sitemap(
    output_dir: &Path,
    config: &SiteConfig,
    date: NaiveDate,
) -> Result<Option<SitemapReport>, SitemapError> {
    if !output_dir.is_dir() {
        log::warn!("{} does not exist; run build first", output_dir.display());
        return Ok(None);
    }
    let pages = collect_pages(output_dir)?;
    if pages.is_empty() {
        log::warn!("no HTML pages found in {}", output_dir.display());
        return Ok(None);
    }

    let lastmod = date.format("%Y-%m-%d").to_string();
    let xml = build_sitemap_xml(&pages, &config.site.url, &lastmod, &config.directory);
    let sitemap_path = output_dir.join("sitemap.xml");
    fs::write(&sitemap_path, xml)?;
    log::info!("sitemap: {} URLs", pages.len());

    let robots = output_dir.join("robots.txt");
    let robots_path = if robots.exists() {
        log::debug!("keeping existing {}", robots.display());
        None
    } else {
        fs::write(&robots, build_robots_txt(&config.site.url))?;
        Some(robots)
    };

    Ok(Some(SitemapReport {
        sitemap_path,
        url_count: pages.len(),
        robots_path,
    }))
}
