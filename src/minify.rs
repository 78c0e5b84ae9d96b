//! HTML minification.
//!
//! Minification is a plain config toggle (`build.minify`). It never fails the
//! build: if the minifier hands back something that is not UTF-8, the page is
//! written unminified.

use std::borrow::Cow;

/// Minify `html` when `enabled`, otherwise return it untouched.
pub fn minify_html(html: &str, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(html);
    }
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    match String::from_utf8(minify_html::minify(html.as_bytes(), &cfg)) {
        Ok(min) => Cow::Owned(min),
        Err(_) => {
            log::warn!("minifier produced invalid UTF-8; writing page unminified");
            Cow::Borrowed(html)
        }
    }
}
