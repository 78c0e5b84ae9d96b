//! Text helpers shared by every pipeline stage.
//!
//! ## Slugs
//!
//! Slugs are the identity of an item (`/api/<slug>.html`) and of a category
//! page (`/category/<slug>.html`). They are a pure function of the input text:
//!
//! - `"Dog API"` → `"dog-api"`
//! - `"  Spaces & Symbols!! "` → `"spaces-symbols"`
//! - `"Ünïcödé Têxt"` → `"unicode-text"`
//! - `"API v2.0"` → `"api-v2-0"`
//!
//! Non-ASCII text is folded to ASCII with `deunicode` first, so the output only
//! ever contains `[a-z0-9-]`, with no leading, trailing or doubled hyphen.
//! Slugifying a slug returns it unchanged.

/// Convert text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    let folded = deunicode::deunicode(text).to_lowercase();
    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// True when `s` is already a well-formed, non-empty slug.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Hashtag for a category: the slug with hyphens removed.
///
/// `"Movies & TV"` → `"#moviestv"`. Returns `None` when nothing is left.
pub fn category_hashtag(category: &str) -> Option<String> {
    let tag = slugify(category).replace('-', "");
    if tag.is_empty() {
        None
    } else {
        Some(format!("#{tag}"))
    }
}

/// Truncate to at most `max` characters, cutting on a word boundary and
/// appending `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    let cut = match head.rfind(' ') {
        Some(pos) => &head[..pos],
        None => head.as_str(),
    };
    format!("{cut}...")
}
