//! The directory item, shared by every stage.
//!
//! Items are persisted as one JSON object each in the repository array
//! (see [`crate::repository`]) and read back by the renderer and the social
//! poster. Fields beyond the common core are variant-specific (`license` for
//! the open-source directory, `format`/`size` for datasets, ...) and are kept
//! verbatim in [`Item::extra`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::text::slugify;

/// Category assigned when a record has none.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default = "default_category", deserialize_with = "null_as_uncategorized")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// URL-safe identity, unique within the collection. Derived from `title`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    /// Authentication requirement (`"None"`, `"apiKey"`, `"OAuth"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<bool>,
    /// CORS support: `"yes"`, `"no"` or `"unknown"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<String>,
    /// Variant-specific fields, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

/// `null` reads the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_uncategorized<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_category))
}

impl Item {
    /// New item with a slug derived from `title` and no optional fields.
    pub fn new(title: &str, description: &str, category: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            url: url.to_string(),
            slug: slugify(title),
            auth: None,
            https: None,
            cors: None,
            extra: BTreeMap::new(),
        }
    }

    /// Category name used for grouping: blank categories fold into
    /// [`UNCATEGORIZED`].
    pub fn category_name(&self) -> &str {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            UNCATEGORIZED
        } else {
            trimmed
        }
    }

    /// Fill in a missing slug from the title. Returns true if it changed.
    pub fn ensure_slug(&mut self) -> bool {
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
            true
        } else {
            false
        }
    }

    /// Auth requirement for display, `"None"` when unset.
    pub fn auth_label(&self) -> &str {
        match self.auth.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => "None",
        }
    }
}
