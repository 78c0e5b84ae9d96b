//! Normalization and deduplication of fetched records.
//!
//! Dataset sources disagree on field names: the public-apis API uses
//! `API`/`Description`/`Link`, mirrors and hand-written files use
//! `title`/`description`/`url`. [`normalize_entry`] reconciles them:
//!
//! | field         | keys tried (first non-empty string wins) | default           |
//! |---------------|------------------------------------------|-------------------|
//! | `title`       | `API`, `name`, `title`                   | required          |
//! | `description` | `Description`, `description`             | required          |
//! | `category`    | `Category`, `category`                   | `"Uncategorized"` |
//! | `url`         | `Link`, `url`, `link`                    | `""`              |
//! | `auth`        | `Auth`, `auth`                           | `"None"`          |
//! | `https`       | `HTTPS` (unless null), `https`           | `true`            |
//! | `cors`        | `Cors`, `cors`                           | `"unknown"`       |
//!
//! A record without a title or description is dropped, never an error. So is
//! one whose title has no letters or digits (`"!!!"`), since it has no slug.

use serde_json::Value;
use std::collections::HashSet;

use crate::item::{Item, UNCATEGORIZED};
use crate::text::slugify;

const TITLE_KEYS: &[&str] = &["API", "name", "title"];
const DESCRIPTION_KEYS: &[&str] = &["Description", "description"];
const CATEGORY_KEYS: &[&str] = &["Category", "category"];
const URL_KEYS: &[&str] = &["Link", "url", "link"];
const AUTH_KEYS: &[&str] = &["Auth", "auth"];
const HTTPS_KEYS: &[&str] = &["HTTPS", "https"];
const CORS_KEYS: &[&str] = &["Cors", "cors"];

/// Map one raw record onto the canonical [`Item`] shape.
///
/// Returns `None` for non-objects, for records whose title or description
/// is empty after trimming, and for titles that leave nothing to slug.
pub fn normalize_entry(raw: &Value) -> Option<Item> {
    let obj = raw.as_object()?;
    let text = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = text(TITLE_KEYS)?;
    let description = text(DESCRIPTION_KEYS)?;
    if slugify(&title).is_empty() {
        return None;
    }
    let category = text(CATEGORY_KEYS).unwrap_or_else(|| UNCATEGORIZED.to_string());
    let url = text(URL_KEYS).unwrap_or_default();

    let mut item = Item::new(&title, &description, &category, &url);
    item.auth = Some(text(AUTH_KEYS).unwrap_or_else(|| "None".to_string()));
    item.https = Some(
        HTTPS_KEYS
            .iter()
            .filter_map(|k| obj.get(*k))
            .find(|v| !v.is_null())
            .map(truthy)
            .unwrap_or(true),
    );
    item.cors = Some(text(CORS_KEYS).unwrap_or_else(|| "unknown".to_string()));
    Some(item)
}

/// Normalize a batch, dropping invalid records.
pub fn normalize_all(raw: &[Value]) -> Vec<Item> {
    raw.iter()
        .filter_map(|entry| {
            let item = normalize_entry(entry);
            if item.is_none() {
                log::debug!("dropping record without a usable title or description: {entry}");
            }
            item
        })
        .collect()
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

/// Drop later duplicates of a slug, then sort case-insensitively by title.
///
/// The first occurrence of each slug wins. The sort is stable, so titles that
/// compare equal keep their arrival order. This is the on-disk order.
pub fn deduplicate(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Item> = items
        .into_iter()
        .filter(|item| seen.insert(item.slug.clone()))
        .collect();
    unique.sort_by_cached_key(|item| item.title.to_lowercase());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_apis_record() {
        let raw = json!({
            "API": "Dog API",
            "Description": "Dog facts",
            "HTTPS": true,
            "Link": "https://dog.ceo"
        });
        let item = normalize_entry(&raw).unwrap();
        assert_eq!(item.title, "Dog API");
        assert_eq!(item.slug, "dog-api");
        assert_eq!(item.https, Some(true));
        assert_eq!(item.auth.as_deref(), Some("None"));
        assert_eq!(item.cors.as_deref(), Some("unknown"));
        assert_eq!(item.url, "https://dog.ceo");
        assert_eq!(item.category, UNCATEGORIZED);
    }

    #[test]
    fn lowercase_alternate_keys() {
        let raw = json!({
            "name": "  Cat Facts ",
            "description": " Random cat facts ",
            "category": "Animals",
            "link": "https://catfact.ninja/",
            "auth": "apiKey",
            "https": false,
            "cors": "yes"
        });
        let item = normalize_entry(&raw).unwrap();
        assert_eq!(item.title, "Cat Facts");
        assert_eq!(item.description, "Random cat facts");
        assert_eq!(item.category, "Animals");
        assert_eq!(item.url, "https://catfact.ninja/");
        assert_eq!(item.auth.as_deref(), Some("apiKey"));
        assert_eq!(item.https, Some(false));
        assert_eq!(item.cors.as_deref(), Some("yes"));
    }

    #[test]
    fn missing_title_or_description_is_dropped() {
        assert!(normalize_entry(&json!({"Description": "no title"})).is_none());
        assert!(normalize_entry(&json!({"API": "No description"})).is_none());
        assert!(normalize_entry(&json!({"API": "   ", "Description": "x"})).is_none());
        assert!(normalize_entry(&json!({"API": "x", "Description": "  "})).is_none());
    }

    #[test]
    fn symbol_only_title_is_dropped() {
        assert!(normalize_entry(&json!({"API": "!!!", "Description": "d"})).is_none());
        let items = normalize_all(&[
            json!({"API": "!!!", "Description": "d"}),
            json!({"API": "???", "Description": "d"}),
            json!({"API": "C++ Tools", "Description": "d"}),
        ]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].slug, "c-tools");
    }

    #[test]
    fn non_object_is_dropped() {
        assert!(normalize_entry(&json!("just a string")).is_none());
        assert!(normalize_entry(&json!(null)).is_none());
    }

    #[test]
    fn https_defaults_true_and_null_falls_through() {
        let absent = normalize_entry(&json!({"API": "A", "Description": "d"})).unwrap();
        assert_eq!(absent.https, Some(true));

        let null_upper =
            normalize_entry(&json!({"API": "A", "Description": "d", "HTTPS": null, "https": false}))
                .unwrap();
        assert_eq!(null_upper.https, Some(false));
    }

    #[test]
    fn non_text_cors_is_unknown() {
        let item = normalize_entry(&json!({"API": "A", "Description": "d", "Cors": 3})).unwrap();
        assert_eq!(item.cors.as_deref(), Some("unknown"));
    }

    #[test]
    fn empty_auth_becomes_none_label() {
        let item = normalize_entry(&json!({"API": "A", "Description": "d", "Auth": ""})).unwrap();
        assert_eq!(item.auth.as_deref(), Some("None"));
    }

    #[test]
    fn normalize_all_skips_invalid() {
        let raw = vec![
            json!({"API": "A", "Description": "d"}),
            json!({"API": "", "Description": "d"}),
            json!(42),
            json!({"title": "B", "description": "e"}),
        ];
        let items = normalize_all(&raw);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    fn with_slug(title: &str, slug: &str) -> Item {
        let mut item = Item::new(title, "d", "c", "");
        item.slug = slug.to_string();
        item
    }

    #[test]
    fn dedup_sorts_by_title() {
        let items = vec![with_slug("Zeta", "zeta"), with_slug("Alpha", "alpha")];
        let out = deduplicate(items);
        let titles: Vec<&str> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn dedup_first_occurrence_wins() {
        let items = vec![
            with_slug("A first", "a"),
            with_slug("B", "b"),
            with_slug("A second", "a"),
        ];
        let out = deduplicate(items);
        let slugs: Vec<&str> = out.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
        assert_eq!(out[0].title, "A first");
    }

    #[test]
    fn dedup_sort_is_case_insensitive() {
        let items = vec![
            with_slug("banana", "banana"),
            with_slug("Apple", "apple"),
            with_slug("cherry", "cherry"),
        ];
        let out = deduplicate(items);
        let titles: Vec<&str> = out.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "banana", "cherry"]);
    }
}
