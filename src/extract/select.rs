//! Small helpers over scraper's element API.

use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::normalize::collapse_whitespace;

/// Parse a CSS selector, logging and returning None if it is invalid.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            debug!("Invalid selector '{}': {}", css, e);
            None
        }
    }
}

/// First descendant of `el` matching `css`.
pub fn first_in<'a>(el: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    el.select(&sel).next()
}

/// Raw text content of an element, line breaks intact.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Collapsed text of the first descendant matching `css`, or empty.
pub fn text_in(el: ElementRef<'_>, css: &str) -> String {
    first_in(el, css)
        .map(|found| collapse_whitespace(&text_of(found)))
        .unwrap_or_default()
}

/// Trimmed attribute value of the first descendant matching `css`.
pub fn attr_in(el: ElementRef<'_>, css: &str, name: &str) -> Option<String> {
    first_in(el, css)
        .and_then(|found| found.value().attr(name))
        .map(|v| v.trim().to_string())
}
