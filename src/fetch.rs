//! Dataset fetching.
//!
//! `quickdir fetch` pulls the raw dataset from the configured sources, in
//! priority order, and rewrites the repository:
//!
//! ```text
//! primary ──fail──▶ alternative ──fail──▶ Skipped (repository untouched)
//!    │                   │
//!    └──────ok───────────┴──▶ normalize ─▶ deduplicate ─▶ save
//! ```
//!
//! A source "fails" on any network error, timeout, non-2xx status,
//! unparseable body or empty entry list. Each source is tried once. Sources
//! answer either with a bare array or with `{"entries": [...]}`; both are
//! accepted from either source.

use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::{HttpConfig, SiteConfig};
use crate::normalize::{deduplicate, normalize_all};
use crate::repository::{self, RepositoryError};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("source returned no entries")]
    NoEntries,
}

/// Result of a fetch run. Only `Saved` touched the repository.
#[derive(Debug, PartialEq)]
pub enum FetchOutcome {
    Saved {
        source: String,
        raw: usize,
        valid: usize,
        unique: usize,
    },
    Skipped(String),
}

/// Create a blocking HTTP client with the configured timeout and user agent.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::blocking::Client, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET one source and return its raw records.
pub fn fetch_source(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Vec<Value>, FetchError> {
    let response = client.get(url).send()?.error_for_status()?;
    let body: Value = serde_json::from_str(&response.text()?)?;
    let entries = extract_entries(body)?;
    if entries.is_empty() {
        return Err(FetchError::NoEntries);
    }
    Ok(entries)
}

/// Accept `[...]` or `{"entries": [...]}`.
fn extract_entries(body: Value) -> Result<Vec<Value>, FetchError> {
    match body {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut obj) => match obj.remove("entries") {
            Some(Value::Array(entries)) => Ok(entries),
            Some(Value::Null) | None => Err(FetchError::Shape(
                "object without an \"entries\" array".to_string(),
            )),
            Some(other) => Err(FetchError::Shape(format!(
                "\"entries\" is not an array: {other}"
            ))),
        },
        other => Err(FetchError::Shape(format!(
            "expected array or object, got {other}"
        ))),
    }
}

/// Try each source in priority order; the first usable one wins.
///
/// Returns `(source, entries)` or `None` when every source failed.
pub fn fetch_first_available(
    client: &reqwest::blocking::Client,
    sources: &[&str],
) -> Option<(String, Vec<Value>)> {
    for url in sources {
        log::info!("fetching {url}");
        match fetch_source(client, url) {
            Ok(entries) => {
                log::info!("{} raw entries from {url}", entries.len());
                return Some((url.to_string(), entries));
            }
            Err(e) => log::warn!("source {url} failed: {e}"),
        }
    }
    None
}

/// Fetch, normalize, deduplicate and save to `db_path`.
///
/// Network trouble is reported as [`FetchOutcome::Skipped`]; only a failed
/// save is an error.
pub fn fetch_and_save(config: &SiteConfig, db_path: &Path) -> Result<FetchOutcome, RepositoryError> {
    let client = match create_client(&config.http) {
        Ok(client) => client,
        Err(e) => return Ok(FetchOutcome::Skipped(format!("HTTP client unavailable: {e}"))),
    };

    let Some((source, entries)) =
        fetch_first_available(&client, &config.sources.in_priority_order())
    else {
        return Ok(FetchOutcome::Skipped(
            "all dataset sources failed; repository left untouched".to_string(),
        ));
    };

    let valid = normalize_all(&entries);
    if valid.is_empty() {
        return Ok(FetchOutcome::Skipped(format!(
            "no valid entries in {} records from {source}",
            entries.len()
        )));
    }
    let valid_count = valid.len();
    let items = deduplicate(valid);

    repository::save(&items, db_path)?;
    log::info!("saved {} items to {}", items.len(), db_path.display());

    Ok(FetchOutcome::Saved {
        source,
        raw: entries.len(),
        valid: valid_count,
        unique: items.len(),
    })
}
