//! Site handling module for Review-Pager
//!
//! This module resolves a resource URL to the site profile holding its
//! locators, and derives file-system friendly names from resources.

mod matcher;
mod profile;

use crate::ConfigError;
use url::Url;

// Re-export main types
pub use matcher::resolve_site;
pub use profile::{SiteProfile, SLOT_PLACEHOLDER};

/// Parses and checks a resource identifier
///
/// Only absolute `http`/`https` URLs with a host are accepted.
pub fn parse_resource_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': scheme must be http or https",
            raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("'{}': missing host", raw)));
    }

    Ok(url)
}

/// Display name used when the page does not expose one
///
/// The last non-empty path segment, or the host for a bare domain.
pub fn fallback_display_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.to_string())
        .or_else(|| url.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "reviews".to_string())
}

/// Replaces characters that cannot appear in a file name
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "reviews".to_string()
    } else {
        cleaned
    }
}
