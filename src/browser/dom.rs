//! Static DOM queries used by the HTTP backend
//!
//! These helpers parse a document (or fragment) on every call and never hold
//! a parsed tree across an await point.

use crate::browser::traits::{BrowserError, BrowserResult};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses a CSS selector, mapping failures to a `BrowserError`
pub fn parse_selector(selector: &str) -> BrowserResult<Selector> {
    Selector::parse(selector).map_err(|e| BrowserError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collected, whitespace-normalized text of an element
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outer HTML of every element in `html` matching `selector`, in document order
pub fn select_outer_html(html: &str, selector: &str) -> BrowserResult<Vec<String>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document
        .select(&selector)
        .map(|element| element.html())
        .collect())
}

/// Text of the first element in `html` matching `selector`
pub fn select_first_text(html: &str, selector: &str) -> BrowserResult<Option<String>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).next().map(element_text))
}

/// Text of the first element inside an item fragment matching `selector`
pub fn fragment_text(fragment: &str, selector: &str) -> BrowserResult<Option<String>> {
    let selector = parse_selector(selector)?;
    let fragment = Html::parse_fragment(fragment);
    Ok(fragment.select(&selector).next().map(element_text))
}

/// Target of the first element matching `selector`, resolved against `base_url`
///
/// # Returns
///
/// * `Ok(Url)` - The element exists and links somewhere navigable
/// * `Err(BrowserError::ElementNotFound)` - Nothing matches `selector`
/// * `Err(BrowserError::NotClickable)` - The element has no usable `href`
pub fn resolve_click_target(html: &str, selector: &str, base_url: &Url) -> BrowserResult<Url> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let element = document
        .select(&parsed)
        .next()
        .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))?;

    element
        .value()
        .attr("href")
        .and_then(|href| resolve_link(href, base_url))
        .ok_or_else(|| BrowserError::NotClickable(selector.to_string()))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link cannot be followed:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
