//! The item repository: one JSON file holding a top-level array of items.
//!
//! The file is rewritten whole on every save. Output is deterministic so that
//! committing it after a scheduled fetch produces minimal diffs:
//!
//! - keys inside each item sorted alphabetically
//! - 2-space indentation
//! - non-ASCII text written as-is
//! - trailing newline
//!
//! Saving the same items twice yields byte-identical files.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::item::Item;
use crate::text::is_slug;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Repository not found: {0}")]
    NotFound(PathBuf),
    #[error("Malformed repository {0}: {1}")]
    Malformed(PathBuf, serde_json::Error),
    #[error("Repository {0} must contain a JSON array")]
    Schema(PathBuf),
    #[error("Repository {path}: item {title:?} has invalid slug {slug:?}")]
    InvalidSlug {
        path: PathBuf,
        title: String,
        slug: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read the item array from `path`.
///
/// Items stored without a slug get one derived from their title. Every slug
/// must then pass [`is_slug`], since it becomes a file name under the output
/// root.
pub fn load(path: &Path) -> Result<Vec<Item>, RepositoryError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RepositoryError::NotFound(path.to_path_buf()),
        _ => RepositoryError::Io(e),
    })?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| RepositoryError::Malformed(path.to_path_buf(), e))?;
    if !value.is_array() {
        return Err(RepositoryError::Schema(path.to_path_buf()));
    }
    let mut items: Vec<Item> = serde_json::from_value(value)
        .map_err(|e| RepositoryError::Malformed(path.to_path_buf(), e))?;
    for item in &mut items {
        item.ensure_slug();
        if !is_slug(&item.slug) {
            return Err(RepositoryError::InvalidSlug {
                path: path.to_path_buf(),
                title: item.title.clone(),
                slug: item.slug.clone(),
            });
        }
    }
    Ok(items)
}

/// Write `items` to `path`, creating parent directories as needed.
pub fn save(items: &[Item], path: &Path) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_json(items)?)?;
    Ok(())
}

/// Serialize items exactly as [`save`] writes them.
pub fn to_json(items: &[Item]) -> Result<String, RepositoryError> {
    // BTreeMap keeps key order alphabetical whatever serde_json's map type is.
    let sorted: Vec<BTreeMap<String, Value>> = items
        .iter()
        .map(|item| serde_json::from_value(serde_json::to_value(item)?))
        .collect::<Result<_, _>>()?;
    let mut json = serde_json::to_string_pretty(&sorted)?;
    json.push('\n');
    Ok(json)
}

/// Slugs that occur more than once, in first-seen order.
///
/// Fetched repositories never contain duplicates; hand-edited ones might, and
/// the later page would silently overwrite the earlier one.
pub fn duplicate_slugs(items: &[Item]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item.slug.as_str()).or_default() += 1;
    }
    let mut dupes = Vec::new();
    for item in items {
        if counts.get(item.slug.as_str()).is_some_and(|&n| n > 1)
            && !dupes.contains(&item.slug)
        {
            dupes.push(item.slug.clone());
        }
    }
    dupes
}
