//! Category grouping.
//!
//! Categories are never stored; they are recomputed from the items on every
//! build. Groups are keyed by category name in ascending order, and each group
//! keeps its items in the order they were received (the repository order).

use std::collections::BTreeMap;

use crate::item::Item;
use crate::text::slugify;

/// Items grouped by category name, ordered by name.
#[derive(Debug, Default)]
pub struct Categories<'a> {
    groups: BTreeMap<String, Vec<&'a Item>>,
}

/// A category as shown in navigation: display name, page slug, item count.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Group `items` by category. No item is dropped or duplicated.
pub fn categorize(items: &[Item]) -> Categories<'_> {
    let mut groups: BTreeMap<String, Vec<&Item>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.category_name().to_string())
            .or_default()
            .push(item);
    }
    Categories { groups }
}

impl<'a> Categories<'a> {
    /// Number of categories.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&[&'a Item]> {
        self.groups.get(name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a Item])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Total number of items across all groups.
    pub fn total_items(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.iter()
            .map(|(name, items)| CategorySummary {
                name: name.to_string(),
                slug: slugify(name),
                count: items.len(),
            })
            .collect()
    }

    /// Other items in `item`'s category, in group order, at most `limit`.
    pub fn related(&self, item: &Item, limit: usize) -> Vec<&'a Item> {
        self.get(item.category_name())
            .unwrap_or_default()
            .iter()
            .filter(|other| other.slug != item.slug)
            .take(limit)
            .copied()
            .collect()
    }
}
