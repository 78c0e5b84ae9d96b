//! HTML site generation.
//!
//! Renders the item repository into a static directory site. Every build
//! starts from an empty output directory: whatever the previous build left
//! behind is removed first, so stale pages never survive.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): category cards and featured items
//! - **Item pages** (`/{item_path}/{slug}.html`): details, related items and
//!   reading recommendations
//! - **Category pages** (`/{category_path}/{category-slug}.html`): every item
//!   in the category
//! - **Error page** (`/404.html`): served by the host for unknown paths
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── api/
//! │   ├── cat-facts.html
//! │   └── dog-api.html
//! ├── category/
//! │   └── animals.html
//! ├── css/style.css
//! ├── js/main.js
//! ├── images/                   # copied from the assets directory
//! └── ads.txt                   # copied from the assets directory
//! ```
//!
//! ## Static Assets
//!
//! A base stylesheet and script are embedded at compile time and always
//! written. `css/`, `js/`, `images/`, `ads.txt` and `robots.txt` from the
//! assets directory are then copied over them when present.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All interpolation is escaped. Pages pass through [`crate::minify`] when
//! `build.minify` is on.

use chrono::{Datelike, NaiveDate};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::categorize::{Categories, CategorySummary, categorize};
use crate::config::SiteConfig;
use crate::item::Item;
use crate::minify::minify_html;
use crate::recommendations::{Recommendation, recommendations_for};
use crate::text::{slugify, truncate};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No items in repository; refusing to build an empty site")]
    Empty,
}

/// File name of the error document. Excluded from the sitemap.
pub const ERROR_PAGE: &str = "404.html";

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/main.js");

/// Directories copied from the assets directory into the output root.
const ASSET_DIRS: &[&str] = &["css", "js", "images"];
/// Files copied from the assets directory into the output root.
const ASSET_FILES: &[&str] = &["ads.txt", "robots.txt"];

/// Meta descriptions are cut to this many characters.
const META_DESCRIPTION_LEN: usize = 160;

/// What a build wrote, for CLI output.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub output_dir: PathBuf,
    pub categories: Vec<CategoryReport>,
    pub item_pages: usize,
    /// Copied asset entries, relative to the output root (`css/`, `ads.txt`).
    pub assets: Vec<String>,
}

#[derive(Debug)]
pub struct CategoryReport {
    pub name: String,
    pub path: String,
    /// `(title, relative path)` of each item page in the category.
    pub items: Vec<(String, String)>,
}

impl GenerateReport {
    /// Item + category + index + error pages.
    pub fn total_pages(&self) -> usize {
        self.item_pages + self.categories.len() + 2
    }
}

/// Values shared by every page: the site config plus the build date.
pub struct PageContext<'a> {
    pub config: &'a SiteConfig,
    pub build_date: String,
    pub year: i32,
}

impl<'a> PageContext<'a> {
    pub fn new(config: &'a SiteConfig, date: NaiveDate) -> Self {
        Self {
            config,
            build_date: date.format("%Y-%m-%d").to_string(),
            year: date.year(),
        }
    }

    fn noun_plural(&self) -> String {
        format!("{}s", self.config.directory.item_noun)
    }

    fn item_href(&self, slug: &str) -> String {
        format!("/{}/{}.html", self.config.directory.item_path, slug)
    }

    fn category_href(&self, category_slug: &str) -> String {
        format!("/{}/{}.html", self.config.directory.category_path, category_slug)
    }
}

/// Head metadata for one page.
struct PageMeta {
    title: String,
    description: String,
    canonical: String,
}

/// Render the whole site from `items` into `output_dir`.
///
/// Refuses to run on an empty collection, before touching the output.
pub fn generate(
    items: &[Item],
    config: &SiteConfig,
    date: NaiveDate,
    output_dir: &Path,
    assets_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    if items.is_empty() {
        return Err(GenerateError::Empty);
    }
    let categories = categorize(items);
    let ctx = PageContext::new(config, date);

    clear_output_dir(output_dir)?;
    log::info!("cleared {}", output_dir.display());

    let mut report = GenerateReport {
        output_dir: output_dir.to_path_buf(),
        ..Default::default()
    };

    // Item pages
    let item_dir = output_dir.join(&config.directory.item_path);
    fs::create_dir_all(&item_dir)?;
    for item in items {
        let related = categories.related(item, config.directory.related_limit);
        let books = recommendations_for(item.category_name(), &config.analytics.affiliate_tag);
        let page = render_item_page(&ctx, item, &related, &books);
        write_page(&item_dir.join(format!("{}.html", item.slug)), page, config)?;
        report.item_pages += 1;
    }
    log::info!("generated {} item pages", report.item_pages);

    // Category pages
    let summaries = categories.summaries();
    let category_dir = output_dir.join(&config.directory.category_path);
    fs::create_dir_all(&category_dir)?;
    for (summary, (_, group)) in summaries.iter().zip(categories.iter()) {
        let page = render_category_page(&ctx, summary, group, &summaries);
        write_page(&category_dir.join(format!("{}.html", summary.slug)), page, config)?;
        report.categories.push(CategoryReport {
            name: summary.name.clone(),
            path: format!("{}/{}.html", config.directory.category_path, summary.slug),
            items: group
                .iter()
                .map(|i| {
                    (
                        i.title.clone(),
                        format!("{}/{}.html", config.directory.item_path, i.slug),
                    )
                })
                .collect(),
        });
    }
    log::info!("generated {} category pages", report.categories.len());

    write_page(
        &output_dir.join("index.html"),
        render_index_page(&ctx, items, &categories),
        config,
    )?;
    write_page(
        &output_dir.join(ERROR_PAGE),
        render_error_page(&ctx),
        config,
    )?;

    report.assets = copy_static_assets(assets_dir, output_dir)?;
    Ok(report)
}

fn write_page(path: &Path, page: Markup, config: &SiteConfig) -> io::Result<()> {
    let html = page.into_string();
    let out = minify_html(&html, config.build.minify);
    log::debug!("writing {}", path.display());
    fs::write(path, out.as_bytes())
}

/// Empty `dir` without removing it, or create it if absent.
///
/// The directory itself may be a bind mount or a deploy target, so only its
/// children are deleted.
pub fn clear_output_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
    }
    fs::create_dir_all(dir)
}

/// Write the embedded assets, then copy user assets over them.
///
/// Returns the entries copied from `assets_dir`.
fn copy_static_assets(assets_dir: &Path, output_dir: &Path) -> io::Result<Vec<String>> {
    fs::create_dir_all(output_dir.join("css"))?;
    fs::write(output_dir.join("css/style.css"), CSS)?;
    fs::create_dir_all(output_dir.join("js"))?;
    fs::write(output_dir.join("js/main.js"), JS)?;

    let mut copied = Vec::new();
    for dir in ASSET_DIRS {
        let src = assets_dir.join(dir);
        if src.is_dir() {
            let dst = output_dir.join(dir);
            fs::create_dir_all(&dst)?;
            copy_dir_recursive(&src, &dst)?;
            copied.push(format!("{dir}/"));
        }
    }
    for file in ASSET_FILES {
        let src = assets_dir.join(file);
        if src.is_file() {
            fs::copy(&src, output_dir.join(file))?;
            copied.push(file.to_string());
        }
    }
    Ok(copied)
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document: head metadata, analytics, header, footer.
fn base_document(ctx: &PageContext, meta: &PageMeta, body_class: &str, content: Markup) -> Markup {
    let site = &ctx.config.site;
    let analytics = &ctx.config.analytics;
    html! {
        (DOCTYPE)
        html lang="en" data-theme="dark" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                link rel="canonical" href=(meta.canonical);
                meta property="og:type" content="website";
                meta property="og:site_name" content=(site.name);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                meta property="og:url" content=(meta.canonical);
                link rel="stylesheet" href="/css/style.css";
                @if !analytics.ga_measurement_id.is_empty() {
                    (google_analytics(&analytics.ga_measurement_id))
                }
                @if !analytics.adsense_publisher_id.is_empty() {
                    script async src={ "https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client=" (analytics.adsense_publisher_id) } crossorigin="anonymous" {}
                }
            }
            body class=(body_class) {
                (site_header(ctx))
                main.container {
                    (content)
                }
                (site_footer(ctx))
                script src="/js/main.js" defer {}
            }
        }
    }
}

fn google_analytics(measurement_id: &str) -> Markup {
    // JSON string literal is a valid JS string literal; `<` is escaped so the
    // value cannot close the script element.
    let id_literal = serde_json::to_string(measurement_id)
        .unwrap_or_default()
        .replace('<', "\\u003c");
    let init = format!(
        "window.dataLayer=window.dataLayer||[];function gtag(){{dataLayer.push(arguments);}}gtag('js',new Date());gtag('config',{id_literal});"
    );
    html! {
        script async src={ "https://www.googletagmanager.com/gtag/js?id=" (measurement_id) } {}
        script { (PreEscaped(init)) }
    }
}

fn site_header(ctx: &PageContext) -> Markup {
    html! {
        header.site-header {
            a.logo href="/" { (ctx.config.site.name) }
            button.menu-toggle type="button" id="mobile-menu-btn" aria-expanded="false" aria-label="Menu" { "☰" }
            nav.site-nav id="main-nav" {
                a.nav-link href="/" { "Home" }
                a.nav-link href="/#categories" { "Categories" }
                button.theme-toggle type="button" id="theme-toggle" aria-label="Toggle dark mode" { "◐" }
            }
        }
    }
}

fn site_footer(ctx: &PageContext) -> Markup {
    html! {
        footer.site-footer {
            p {
                "© " (ctx.year) " " (ctx.config.site.name) ". Updated " (ctx.build_date) "."
            }
            p {
                a href="/sitemap.xml" { "Sitemap" }
            }
        }
    }
}

fn breadcrumb(trail: &[(&str, Option<String>)]) -> Markup {
    html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            a href="/" { "Home" }
            @for (label, href) in trail {
                " › "
                @if let Some(href) = href {
                    a href=(href) { (label) }
                } @else {
                    span { (label) }
                }
            }
        }
    }
}

/// Compact item card used on index and category listings.
fn item_card(ctx: &PageContext, item: &Item) -> Markup {
    html! {
        li.item-card {
            a href=(ctx.item_href(&item.slug)) {
                h3 { (item.title) }
                p { (truncate(&item.description, 120)) }
                span.badge { (item.category_name()) }
            }
        }
    }
}

/// `license` → "License", `alternative_to` → "Alternative to".
fn field_label(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn field_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Array(values) => values
            .iter()
            .map(field_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one item page.
pub fn render_item_page(
    ctx: &PageContext,
    item: &Item,
    related: &[&Item],
    books: &[Recommendation],
) -> Markup {
    let config = ctx.config;
    let category = item.category_name();
    let category_slug = slugify(category);
    let noun = &config.directory.item_noun;

    let meta = PageMeta {
        title: format!("{} - Free {} | {}", item.title, noun, config.site.name),
        description: truncate(&item.description, META_DESCRIPTION_LEN),
        canonical: config.item_url(&item.slug),
    };

    let extras: Vec<(String, String)> = item
        .extra
        .iter()
        .map(|(k, v)| (field_label(k), field_value(v)))
        .filter(|(_, v)| !v.is_empty())
        .collect();

    let content = html! {
        (breadcrumb(&[
            (category, Some(ctx.category_href(&category_slug))),
            (item.title.as_str(), None),
        ]))
        article.item-detail {
            h1 { (item.title) }
            p.lead { (item.description) }
            table.item-meta {
                tbody {
                    tr {
                        th scope="row" { "Category" }
                        td { a href=(ctx.category_href(&category_slug)) { (category) } }
                    }
                    @if let Some(auth) = &item.auth {
                        tr { th scope="row" { "Auth" } td { (auth) } }
                    }
                    @if let Some(https) = item.https {
                        tr { th scope="row" { "HTTPS" } td { @if https { "Yes" } @else { "No" } } }
                    }
                    @if let Some(cors) = &item.cors {
                        tr { th scope="row" { "CORS" } td { (cors) } }
                    }
                    @for (label, value) in &extras {
                        tr { th scope="row" { (label) } td { (value) } }
                    }
                }
            }
            @if !item.url.is_empty() {
                a.button href=(item.url) target="_blank" rel="noopener nofollow" {
                    "Visit " (item.title) " →"
                }
            }
        }
        @if !related.is_empty() {
            section.related {
                h2 { "Related " (category) " " (ctx.noun_plural()) }
                ul.item-grid {
                    @for other in related {
                        (item_card(ctx, other))
                    }
                }
            }
        }
        @if !books.is_empty() {
            section.recommendations {
                h2 { "Recommended Reading" }
                ul.book-list {
                    @for book in books {
                        li {
                            a href=(book.url) target="_blank" rel="sponsored nofollow noopener" {
                                (book.title)
                            }
                            " by " (book.author)
                        }
                    }
                }
                p.disclosure { "As an Amazon Associate we earn from qualifying purchases." }
            }
        }
    };

    base_document(ctx, &meta, "item-page", content)
}

/// Renders a category listing page.
pub fn render_category_page(
    ctx: &PageContext,
    summary: &CategorySummary,
    items: &[&Item],
    all_categories: &[CategorySummary],
) -> Markup {
    let config = ctx.config;
    let plural = ctx.noun_plural();

    let meta = PageMeta {
        title: format!("{} {} - Free & Open | {}", summary.name, plural, config.site.name),
        description: truncate(
            &format!(
                "Browse {} free {} {}. Find the best open {} for {} development.",
                summary.count,
                summary.name,
                plural,
                plural,
                summary.name.to_lowercase()
            ),
            META_DESCRIPTION_LEN,
        ),
        canonical: config.category_url(&summary.slug),
    };

    let content = html! {
        (breadcrumb(&[(summary.name.as_str(), None)]))
        header.page-header {
            h1 { (summary.name) " " (plural) }
            p { (summary.count) " free " (summary.name) " " (plural) }
        }
        div.with-sidebar {
            ul.item-grid {
                @for item in items {
                    (item_card(ctx, item))
                }
            }
            aside.category-list {
                h2 { "All Categories" }
                ul {
                    @for cat in all_categories {
                        @let is_current = cat.slug == summary.slug;
                        li class=[is_current.then_some("current")] {
                            a href=(ctx.category_href(&cat.slug)) { (cat.name) }
                            " (" (cat.count) ")"
                        }
                    }
                }
            }
        }
    };

    base_document(ctx, &meta, "category-page", content)
}

/// Renders the home page: hero, category cards, featured items.
pub fn render_index_page(ctx: &PageContext, items: &[Item], categories: &Categories) -> Markup {
    let config = ctx.config;
    let plural = ctx.noun_plural();
    let featured = &items[..items.len().min(config.directory.featured_count)];

    let meta = PageMeta {
        title: format!("{} — Discover Free & Open {}", config.site.name, plural),
        description: truncate(&config.site.description, META_DESCRIPTION_LEN),
        canonical: format!("{}/", config.site.url),
    };

    let content = html! {
        section.hero {
            h1 { (config.site.name) }
            p.lead { (config.site.description) }
            p.stats {
                strong { (items.len()) } " " (plural) " across "
                strong { (categories.len()) } " categories"
            }
        }
        section id="categories" {
            h2 { "Browse by Category" }
            ul.category-grid {
                @for cat in categories.summaries() {
                    li.category-card {
                        a href=(ctx.category_href(&cat.slug)) {
                            span.category-name { (cat.name) }
                            span.category-count { (cat.count) " " (plural) }
                        }
                    }
                }
            }
        }
        @if !featured.is_empty() {
            section.featured {
                h2 { "Featured " (plural) }
                ul.item-grid {
                    @for item in featured {
                        (item_card(ctx, item))
                    }
                }
            }
        }
    };

    base_document(ctx, &meta, "index-page", content)
}

/// Renders the error document.
pub fn render_error_page(ctx: &PageContext) -> Markup {
    let config = ctx.config;
    let meta = PageMeta {
        title: format!("Page Not Found | {}", config.site.name),
        description: "The page you're looking for doesn't exist.".to_string(),
        canonical: format!("{}/", config.site.url),
    };
    let content = html! {
        section.not-found {
            h1 { "Page Not Found" }
            p { "The page you're looking for doesn't exist or has moved." }
            a.button href="/" { "Back to the directory" }
        }
    };
    base_document(ctx, &meta, "error-page", content)
}

// ============================================================================
// Tests
// ============================================================================
