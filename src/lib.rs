//! # quickdir
//!
//! A static site generator for programmatic SEO directories: free APIs,
//! open-source tools, public datasets. One JSON file is the whole database;
//! every build turns it into a page per item, a page per category, an index
//! and a sitemap.
//!
//! # Architecture: Independent Runs Over One Repository
//!
//! Each command runs on its own schedule and communicates with the others
//! only through the repository file and the output directory:
//!
//! ```text
//! fetch     sources  →  normalize → deduplicate → data/database.json
//! build     data/database.json  →  categorize → render → dist/
//! sitemap   dist/  →  dist/sitemap.xml, dist/robots.txt
//! post      data/database.json  →  select today's item → Mastodon
//! ```
//!
//! A failed fetch leaves yesterday's repository in place, so a build always
//! has something to render. The sitemap is derived from the output tree,
//! not from the repository, so it lists exactly what was deployed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`item`] | The `Item` record shared by every stage |
//! | [`text`] | Slugs, category hashtags, word-aware truncation |
//! | [`normalize`] | Maps heterogeneous source records to items; dedupes and sorts |
//! | [`repository`] | Deterministic JSON load/save of the item array |
//! | [`categorize`] | Groups items by category for navigation and related items |
//! | [`fetch`] | Downloads the dataset from the primary or alternative source |
//! | [`generate`] | Renders item, category, index and error pages with Maud |
//! | [`recommendations`] | Curated books per category with affiliate links |
//! | [`minify`] | Optional HTML minification of rendered pages |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` from the built output |
//! | [`social`] | Deterministic daily pick and Mastodon post |
//! | [`config`] | Layered `site.toml` + environment configuration |
//! | [`output`] | CLI output formatting for every command |
//!
//! # Design Decisions
//!
//! ## One Binary, Many Directories
//!
//! The API, open-source, dataset and tools directories differ only in
//! wording, output paths and which extra fields their items carry. Those are
//! configuration (`[directory]` in `site.toml`), and extra fields are kept
//! verbatim on [`item::Item::extra`] and rendered generically.
//!
//! ## Deterministic Repository
//!
//! The repository is committed by a scheduled job after every fetch. Sorted
//! keys, a fixed item order and stable formatting keep those commits down to
//! the items that actually changed.
//!
//! ## Date-Seeded Daily Post
//!
//! The daily item is a pure function of the UTC date ([`social::select_daily`]).
//! Retries, reruns and concurrent jobs all pick the same item without any
//! shared state.

pub mod categorize;
pub mod config;
pub mod fetch;
pub mod generate;
pub mod item;
pub mod minify;
pub mod normalize;
pub mod output;
pub mod recommendations;
pub mod repository;
pub mod sitemap;
pub mod social;
pub mod text;

#[cfg(test)]
pub(crate) mod test_helpers;
