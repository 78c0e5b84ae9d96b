//! Site configuration module.
//!
//! One [`SiteConfig`] is built at process start and passed by reference to
//! every stage. It is assembled from three layers, later layers winning:
//!
//! 1. Stock defaults (the API directory)
//! 2. `site.toml`, if present (sparse: override only what you need)
//! 3. Environment variables
//!
//! ## Environment Overrides
//!
//! | Variable                | Key                              |
//! |-------------------------|----------------------------------|
//! | `SITE_URL`              | `site.url`                       |
//! | `GA_MEASUREMENT_ID`     | `analytics.ga_measurement_id`    |
//! | `ADSENSE_PUBLISHER_ID`  | `analytics.adsense_publisher_id` |
//! | `AMAZON_AFFILIATE_TAG`  | `analytics.affiliate_tag`        |
//! | `MASTODON_ACCESS_TOKEN` | `social.access_token`            |
//! | `MASTODON_INSTANCE_URL` | `social.instance_url`            |
//!
//! Empty variables are ignored. Components never read the environment
//! themselves.
//!
//! ## Directory Variants
//!
//! The same binary builds the API, open-source, dataset and tools directories.
//! A variant is just a `site.toml`:
//!
//! ```toml
//! [site]
//! name = "Public Datasets Directory"
//! url = "https://datasets.quickutils.top"
//!
//! [directory]
//! item_noun = "Dataset"
//! item_path = "dataset"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::text::is_slug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml` and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in titles, canonical URLs and the sitemap.
    pub site: SiteMeta,
    /// Output layout and wording for the directory variant.
    pub directory: DirectoryConfig,
    /// Analytics, ads and affiliate identifiers injected into every page.
    pub analytics: AnalyticsConfig,
    /// Remote dataset sources, tried in order.
    pub sources: SourcesConfig,
    /// Daily social post settings.
    pub social: SocialConfig,
    /// Outbound HTTP settings.
    pub http: HttpConfig,
    /// Build toggles.
    pub build: BuildConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub name: String,
    /// Absolute base URL, no trailing slash.
    pub url: String,
    pub description: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            name: "QuickUtils API Directory".to_string(),
            url: "https://directory.quickutils.top".to_string(),
            description: "The Ultimate Directory of Free, Open APIs — searchable, categorized, and always up-to-date.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// What one item is called in page titles ("API", "Dataset", "Tool").
    pub item_noun: String,
    /// Output subdirectory for item pages.
    pub item_path: String,
    /// Output subdirectory for category pages.
    pub category_path: String,
    /// Items shown on the index page.
    pub featured_count: usize,
    /// Related items shown on each item page.
    pub related_limit: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            item_noun: "API".to_string(),
            item_path: "api".to_string(),
            category_path: "category".to_string(),
            featured_count: 8,
            related_limit: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsConfig {
    pub ga_measurement_id: String,
    pub adsense_publisher_id: String,
    /// Amazon associate tag appended to recommendation links.
    pub affiliate_tag: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            ga_measurement_id: "G-LKF615Z8NY".to_string(),
            adsense_publisher_id: "ca-pub-XXXXXXXXXX".to_string(),
            affiliate_tag: "quickutils-20".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub primary: String,
    pub alternative: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            primary: "https://api.publicapis.org/entries".to_string(),
            alternative: "https://raw.githubusercontent.com/marcelscruz/public-apis/main/db/data.json"
                .to_string(),
        }
    }
}

impl SourcesConfig {
    /// Sources in the order they are tried.
    pub fn in_priority_order(&self) -> [&str; 2] {
        [self.primary.as_str(), self.alternative.as_str()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialConfig {
    /// Instance host or URL; `https://` is assumed when no scheme is given.
    pub instance_url: String,
    /// Bearer token. Normally supplied via `MASTODON_ACCESS_TOKEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub visibility: String,
    /// Hashtags appended to every post, before the category tag.
    pub hashtags: Vec<String>,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            instance_url: "mastodon.social".to_string(),
            access_token: None,
            visibility: "public".to_string(),
            hashtags: vec![
                "#API".to_string(),
                "#OpenSource".to_string(),
                "#FreeDev".to_string(),
                "#WebDev".to_string(),
            ],
        }
    }
}

impl SocialConfig {
    /// Full statuses endpoint for the configured instance.
    pub fn statuses_endpoint(&self) -> String {
        let base = self.instance_url.trim_end_matches('/');
        if base.starts_with("http") {
            format!("{base}/api/v1/statuses")
        } else {
            format!("https://{base}/api/v1/statuses")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Per-request timeout; a request that exceeds it counts as failed.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("quickdir/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Strip whitespace and comments from rendered pages.
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { minify: true }
    }
}

impl SiteConfig {
    /// Validate values and normalize the site URL.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let url = self.site.url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "site.url must start with http:// or https:// (got {:?})",
                self.site.url
            )));
        }
        self.site.url = url;

        let dir = &self.directory;
        if !is_slug(&dir.item_path) {
            return Err(ConfigError::Validation(
                "directory.item_path must be a lowercase slug".into(),
            ));
        }
        if !is_slug(&dir.category_path) {
            return Err(ConfigError::Validation(
                "directory.category_path must be a lowercase slug".into(),
            ));
        }
        if dir.item_path == dir.category_path {
            return Err(ConfigError::Validation(
                "directory.item_path and directory.category_path must differ".into(),
            ));
        }
        if dir.related_limit == 0 {
            return Err(ConfigError::Validation(
                "directory.related_limit must be at least 1".into(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("SITE_URL") {
            self.site.url = v;
        }
        if let Some(v) = get("GA_MEASUREMENT_ID") {
            self.analytics.ga_measurement_id = v;
        }
        if let Some(v) = get("ADSENSE_PUBLISHER_ID") {
            self.analytics.adsense_publisher_id = v;
        }
        if let Some(v) = get("AMAZON_AFFILIATE_TAG") {
            self.analytics.affiliate_tag = v;
        }
        if let Some(v) = get("MASTODON_ACCESS_TOKEN") {
            self.social.access_token = Some(v);
        }
        if let Some(v) = get("MASTODON_INSTANCE_URL") {
            self.social.instance_url = v;
        }
    }

    /// Absolute URL of an item page.
    pub fn item_url(&self, slug: &str) -> String {
        format!("{}/{}/{}.html", self.site.url, self.directory.item_path, slug)
    }

    /// Absolute URL of a category page.
    pub fn category_url(&self, category_slug: &str) -> String {
        format!(
            "{}/{}/{}.html",
            self.site.url, self.directory.category_path, category_slug
        )
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` when the file is absent.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge defaults, the optional file overlay and the environment, then validate.
pub fn resolve_config<F>(overlay: Option<toml::Value>, env: F) -> Result<SiteConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let merged = match overlay {
        Some(ov) => merge_toml(stock_defaults_value(), ov),
        None => stock_defaults_value(),
    };
    let mut config: SiteConfig = merged.try_into()?;
    config.apply_env(env);
    config.validate()?;
    Ok(config)
}

/// Load `path` (if present) on top of the defaults, then the process environment.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(overlay, |key| std::env::var(key).ok())
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# quickdir site configuration
# ============================
# All settings are optional. Values shown below are the defaults.
# Environment variables override this file:
#   SITE_URL, GA_MEASUREMENT_ID, ADSENSE_PUBLISHER_ID, AMAZON_AFFILIATE_TAG,
#   MASTODON_ACCESS_TOKEN, MASTODON_INSTANCE_URL
# Unknown keys will cause an error.

[site]
name = "QuickUtils API Directory"
url = "https://directory.quickutils.top"
description = "The Ultimate Directory of Free, Open APIs — searchable, categorized, and always up-to-date."

# ---------------------------------------------------------------------------
# Directory layout and wording
# ---------------------------------------------------------------------------
[directory]
# What one entry is called in titles: "API", "Tool", "Dataset", ...
item_noun = "API"
# Item pages are written to <output>/<item_path>/<slug>.html
item_path = "api"
# Category pages are written to <output>/<category_path>/<slug>.html
category_path = "category"
# Entries featured on the home page.
featured_count = 8
# Related entries (same category) listed on each item page.
related_limit = 6

# ---------------------------------------------------------------------------
# Analytics, ads, affiliate links
# ---------------------------------------------------------------------------
[analytics]
ga_measurement_id = "G-LKF615Z8NY"
adsense_publisher_id = "ca-pub-XXXXXXXXXX"
affiliate_tag = "quickutils-20"

# ---------------------------------------------------------------------------
# Dataset sources for `quickdir fetch`, tried in order
# ---------------------------------------------------------------------------
[sources]
primary = "https://api.publicapis.org/entries"
alternative = "https://raw.githubusercontent.com/marcelscruz/public-apis/main/db/data.json"

# ---------------------------------------------------------------------------
# Daily social post (`quickdir post`)
# ---------------------------------------------------------------------------
[social]
instance_url = "mastodon.social"
visibility = "public"
hashtags = ["#API", "#OpenSource", "#FreeDev", "#WebDev"]
# access_token is normally supplied via MASTODON_ACCESS_TOKEN.
# access_token = "..."

# ---------------------------------------------------------------------------
# Outbound HTTP
# ---------------------------------------------------------------------------
[http]
timeout_secs = 30
# user_agent = "quickdir/<version>"

# ---------------------------------------------------------------------------
# Build
# ---------------------------------------------------------------------------
[build]
# Strip whitespace and comments from generated HTML.
minify = true
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_describe_api_directory() {
        let config = SiteConfig::default();
        assert_eq!(config.site.url, "https://directory.quickutils.top");
        assert_eq!(config.directory.item_path, "api");
        assert_eq!(config.directory.category_path, "category");
        assert_eq!(config.directory.related_limit, 6);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.build.minify);
        assert!(config.social.access_token.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[site]
name = "Public Datasets Directory"

[directory]
item_noun = "Dataset"
item_path = "dataset"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.site.name, "Public Datasets Directory");
        assert_eq!(config.directory.item_path, "dataset");
        // Defaults preserved
        assert_eq!(config.site.url, "https://directory.quickutils.top");
        assert_eq!(config.directory.category_path, "category");
    }

    #[test]
    fn env_overrides_file_values() {
        let overlay: toml::Value = toml::from_str(
            r#"
[site]
url = "https://from-file.example"
"#,
        )
        .unwrap();
        let env = env_from(&[
            ("SITE_URL", "https://from-env.example/"),
            ("AMAZON_AFFILIATE_TAG", "envtag-20"),
            ("MASTODON_ACCESS_TOKEN", "secret"),
            ("MASTODON_INSTANCE_URL", "fosstodon.org"),
        ]);
        let config = resolve_config(Some(overlay), env).unwrap();
        assert_eq!(config.site.url, "https://from-env.example");
        assert_eq!(config.analytics.affiliate_tag, "envtag-20");
        assert_eq!(config.social.access_token.as_deref(), Some("secret"));
        assert_eq!(config.social.instance_url, "fosstodon.org");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let env = env_from(&[("SITE_URL", ""), ("MASTODON_ACCESS_TOKEN", "  ")]);
        let config = resolve_config(None, env).unwrap();
        assert_eq!(config.site.url, "https://directory.quickutils.top");
        assert!(config.social.access_token.is_none());
    }

    #[test]
    fn trailing_slash_stripped_from_site_url() {
        let env = env_from(&[("SITE_URL", "https://example.com/")]);
        let config = resolve_config(None, env).unwrap();
        assert_eq!(config.site.url, "https://example.com");
    }

    #[test]
    fn statuses_endpoint_adds_scheme() {
        let mut social = SocialConfig::default();
        assert_eq!(
            social.statuses_endpoint(),
            "https://mastodon.social/api/v1/statuses"
        );
        social.instance_url = "http://127.0.0.1:8080/".to_string();
        assert_eq!(
            social.statuses_endpoint(),
            "http://127.0.0.1:8080/api/v1/statuses"
        );
    }

    #[test]
    fn item_and_category_urls() {
        let config = SiteConfig::default();
        assert_eq!(
            config.item_url("dog-api"),
            "https://directory.quickutils.top/api/dog-api.html"
        );
        assert_eq!(
            config.category_url("animals"),
            "https://directory.quickutils.top/category/animals.html"
        );
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_raw_config_none_when_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join("site.toml")).unwrap().is_none());
    }

    #[test]
    fn load_raw_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "[build]\nminify = false\n").unwrap();
        let raw = load_raw_config(&path).unwrap().unwrap();
        let config = resolve_config(Some(raw), no_env).unwrap();
        assert!(!config.build.minify);
    }

    #[test]
    fn invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();
        assert!(matches!(load_raw_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let overlay: toml::Value = toml::from_str("[directory]\nitem_pth = \"x\"\n").unwrap();
        let result = resolve_config(Some(overlay), no_env);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[sitee]\nname = \"x\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_passes() {
        let mut config = SiteConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_relative_site_url() {
        let env = env_from(&[("SITE_URL", "directory.example")]);
        let err = resolve_config(None, env).unwrap_err();
        assert!(err.to_string().contains("site.url"));
    }

    #[test]
    fn validate_rejects_bad_paths() {
        let mut config = SiteConfig::default();
        config.directory.item_path = "Api Pages".to_string();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.directory.category_path = "api".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout_and_limit() {
        let mut config = SiteConfig::default();
        config.http.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SiteConfig::default();
        config.directory.related_limit = 0;
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[site]\nname = \"a\"\nurl = \"u\"\n").unwrap();
        let overlay: toml::Value = toml::from_str("[site]\nname = \"b\"\n").unwrap();
        let merged = merge_toml(base, overlay);
        let site = merged.get("site").unwrap();
        assert_eq!(site.get("name").unwrap().as_str(), Some("b"));
        assert_eq!(site.get("url").unwrap().as_str(), Some("u"));
    }

    #[test]
    fn merge_toml_arrays_replace() {
        let base: toml::Value = toml::from_str("tags = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("tags = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("tags").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.name, defaults.site.name);
        assert_eq!(config.site.url, defaults.site.url);
        assert_eq!(config.site.description, defaults.site.description);
        assert_eq!(config.directory.item_path, defaults.directory.item_path);
        assert_eq!(config.sources.primary, defaults.sources.primary);
        assert_eq!(config.sources.alternative, defaults.sources.alternative);
        assert_eq!(config.social.hashtags, defaults.social.hashtags);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.build.minify);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["site", "directory", "analytics", "sources", "social", "http", "build"] {
            assert!(val.get(section).is_some(), "missing [{section}]");
        }
    }
}
