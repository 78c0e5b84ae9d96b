//! Daily social post.
//!
//! Once a day one item from the repository is announced on a Mastodon
//! compatible instance. The choice depends only on the UTC date, so reruns
//! and parallel jobs on the same day agree on the item:
//!
//! ```text
//! "2025-01-01" ─sha256─▶ 14973c59… ─first 4 bytes─▶ seed ─splitmix64─▶ draw % len
//! ```
//!
//! Posting is best effort. A missing token, a network error or a rejected
//! request all end in a [`PostOutcome`], never in an error.

use chrono::NaiveDate;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::SiteConfig;
use crate::fetch::create_client;
use crate::item::Item;
use crate::text::category_hashtag;

/// Maximum status length accepted by the instance, in characters.
pub const POST_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum SocialError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Could not create HTTP client: {0}")]
    Client(#[from] crate::fetch::FetchError),
}

#[derive(Debug, PartialEq)]
pub enum PostOutcome {
    /// Accepted; `url` is the status URL when the instance returned one.
    Posted { url: Option<String> },
    /// No access token configured.
    Skipped,
    Failed(String),
}

/// The day's selection and what happened to it.
#[derive(Debug)]
pub struct DailyPost {
    pub title: String,
    pub category: String,
    pub message: String,
    pub outcome: PostOutcome,
}

/// Seed for `date`: the first four bytes of SHA-256 over `YYYY-MM-DD`.
pub fn daily_seed(date: NaiveDate) -> u32 {
    let digest = Sha256::digest(date.format("%Y-%m-%d").to_string().as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// The item for `date`, or `None` for an empty collection.
pub fn select_daily(items: &[Item], date: NaiveDate) -> Option<&Item> {
    if items.is_empty() {
        return None;
    }
    let mut state = u64::from(daily_seed(date));
    let index = splitmix64(&mut state) % items.len() as u64;
    items.get(index as usize)
}

/// Compose the status text, cut to [`POST_LIMIT`] characters.
pub fn format_post(item: &Item, config: &SiteConfig) -> String {
    let category = item.category_name();
    let https = if item.https.unwrap_or(false) {
        "HTTPS ✅"
    } else {
        "HTTP only"
    };

    let mut tags = config.social.hashtags.clone();
    tags.extend(category_hashtag(category));

    let lines = [
        format!("🔗 {}", item.title),
        String::new(),
        item.description.clone(),
        String::new(),
        format!("🏷️ Category: {category}"),
        format!("🔐 Auth: {}", item.auth_label()),
        format!("🌐 {https}"),
        String::new(),
        format!("Check it out → {}", config.item_url(&item.slug)),
        String::new(),
        tags.join(" "),
    ];
    let post = lines.join("\n");

    if post.chars().count() > POST_LIMIT {
        let head: String = post.chars().take(POST_LIMIT - 3).collect();
        format!("{head}...")
    } else {
        post
    }
}

/// Submit `message` as a new status.
pub fn post_status(message: &str, config: &SiteConfig) -> PostOutcome {
    let Some(token) = config.social.access_token.as_deref() else {
        log::warn!("MASTODON_ACCESS_TOKEN not set; skipping post");
        return PostOutcome::Skipped;
    };
    match send_status(message, token, config) {
        Ok(url) => PostOutcome::Posted { url },
        Err(e) => {
            log::warn!("post failed: {e}");
            PostOutcome::Failed(e.to_string())
        }
    }
}

fn send_status(message: &str, token: &str, config: &SiteConfig) -> Result<Option<String>, SocialError> {
    let client = create_client(&config.http)?;
    let endpoint = config.social.statuses_endpoint();
    log::info!("posting to {endpoint}");
    let response = client
        .post(&endpoint)
        .bearer_auth(token)
        .form(&[
            ("status", message),
            ("visibility", config.social.visibility.as_str()),
        ])
        .send()?
        .error_for_status()?;

    // The status URL is informational; a body we can't read still counts as posted.
    let url = response
        .json::<Value>()
        .ok()
        .and_then(|body| body.get("url").and_then(Value::as_str).map(str::to_string));
    Ok(url)
}

/// Select, format and post the item for `date`. `None` when there are no items.
pub fn post_daily(items: &[Item], config: &SiteConfig, date: NaiveDate) -> Option<DailyPost> {
    let item = select_daily(items, date)?;
    log::info!("selected {} ({})", item.title, item.category_name());
    let message = format_post(item, config);
    let outcome = post_status(&message, config);
    Some(DailyPost {
        title: item.title.clone(),
        category: item.category_name().to_string(),
        message,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_items, serve_once, test_date, unused_url};

    fn config_for(instance: &str, token: Option<&str>) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.social.instance_url = instance.to_string();
        config.social.access_token = token.map(str::to_string);
        config.http.timeout_secs = 5;
        config
    }

    // =========================================================================
    // Daily selection
    // =========================================================================

    #[test]
    fn seed_is_leading_digest_bytes() {
        // sha256("2025-01-01") starts with 14973c59
        assert_eq!(daily_seed(test_date()), 0x1497_3c59);
    }

    #[test]
    fn selection_is_stable_for_a_date() {
        let items = sample_items();
        let first = select_daily(&items, test_date()).unwrap();
        let second = select_daily(&items, test_date()).unwrap();
        assert_eq!(first.slug, second.slug);
        assert_eq!(first.title, "OpenWeatherMap");
    }

    #[test]
    fn selection_changes_with_date() {
        let items = sample_items();
        let next_day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(select_daily(&items, next_day).unwrap().title, "Open Library");
    }

    #[test]
    fn empty_collection_selects_nothing() {
        assert!(select_daily(&[], test_date()).is_none());
        assert!(post_daily(&[], &SiteConfig::default(), test_date()).is_none());
    }

    // =========================================================================
    // format_post
    // =========================================================================

    #[test]
    fn post_layout() {
        let items = sample_items();
        let dog = items.iter().find(|i| i.slug == "dog-api").unwrap();
        let post = format_post(dog, &SiteConfig::default());
        let lines: Vec<&str> = post.lines().collect();
        assert_eq!(lines[0], "🔗 Dog API");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Based on the Stanford Dogs Dataset");
        assert_eq!(lines[4], "🏷️ Category: Animals");
        assert_eq!(lines[5], "🔐 Auth: None");
        assert_eq!(lines[6], "🌐 HTTPS ✅");
        assert_eq!(
            lines[8],
            "Check it out → https://directory.quickutils.top/api/dog-api.html"
        );
        assert_eq!(lines[10], "#API #OpenSource #FreeDev #WebDev #animals");
    }

    #[test]
    fn http_only_and_missing_auth() {
        let mut item = Item::new("Plain", "d", "Movies & TV", "");
        item.https = Some(false);
        let post = format_post(&item, &SiteConfig::default());
        assert!(post.contains("🌐 HTTP only"));
        assert!(post.contains("🔐 Auth: None"));
        assert!(post.ends_with("#moviestv"));
    }

    #[test]
    fn long_description_is_cut_to_limit() {
        let item = Item::new("Long", &"x".repeat(500), "Test", "");
        let post = format_post(&item, &SiteConfig::default());
        assert_eq!(post.chars().count(), POST_LIMIT);
        assert!(post.ends_with("..."));
        assert!(post.starts_with("🔗 Long"));
    }

    #[test]
    fn multibyte_text_counts_characters() {
        let item = Item::new("Émoji", &"é".repeat(600), "Test", "");
        let post = format_post(&item, &SiteConfig::default());
        assert_eq!(post.chars().count(), POST_LIMIT);
    }

    #[test]
    fn short_post_is_untouched() {
        let item = Item::new("Short", "tiny", "Test", "");
        let post = format_post(&item, &SiteConfig::default());
        assert!(!post.ends_with("..."));
        assert!(post.chars().count() < POST_LIMIT);
    }

    // =========================================================================
    // post_status
    // =========================================================================

    #[test]
    fn no_token_skips() {
        let config = config_for(&unused_url(), None);
        assert_eq!(post_status("hello", &config), PostOutcome::Skipped);
    }

    #[test]
    fn successful_post_sends_bearer_and_form() {
        let (base, handle) = serve_once(200, r#"{"id": "1", "url": "https://m.example/@bot/1"}"#);
        let config = config_for(&base, Some("secret-token"));

        let outcome = post_status("Hello & welcome", &config);
        let request = handle.join().unwrap();

        assert_eq!(
            outcome,
            PostOutcome::Posted {
                url: Some("https://m.example/@bot/1".to_string())
            }
        );
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "/api/v1/statuses");
        assert_eq!(request.header("Authorization"), Some("Bearer secret-token"));
        assert!(request.body.contains("status=Hello+%26+welcome"));
        assert!(request.body.contains("visibility=public"));
    }

    #[test]
    fn rejected_post_is_failed() {
        let (base, handle) = serve_once(401, r#"{"error": "The access token is invalid"}"#);
        let config = config_for(&base, Some("bad"));
        let outcome = post_status("hi", &config);
        handle.join().unwrap();
        assert!(matches!(outcome, PostOutcome::Failed(_)));
    }

    #[test]
    fn unreachable_instance_is_failed() {
        let config = config_for(&unused_url(), Some("token"));
        assert!(matches!(post_status("hi", &config), PostOutcome::Failed(_)));
    }

    #[test]
    fn post_daily_reports_selection() {
        let (base, handle) = serve_once(200, "{}");
        let config = config_for(&base, Some("token"));
        let daily = post_daily(&sample_items(), &config, test_date()).unwrap();
        handle.join().unwrap();
        assert_eq!(daily.title, "OpenWeatherMap");
        assert_eq!(daily.category, "Weather");
        assert_eq!(daily.outcome, PostOutcome::Posted { url: None });
        assert!(daily.message.contains("#weather"));
    }
}
