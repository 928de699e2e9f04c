//! Compiled site profile
//!
//! A `SiteProfile` is the validated, ready-to-use form of a `[[site]]`
//! configuration entry.

use crate::config::SiteEntry;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Placeholder substituted by the paginator slot number
pub const SLOT_PLACEHOLDER: &str = "{index}";

/// Locators and markers for one family of review pages
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pattern: Regex,
    pub blocked_url: Option<String>,
    pub product_name: Option<String>,
    pub review_count: String,
    pub sort_recent: Option<String>,
    pagination_button: String,
    pub review_items: String,
    pub rating: String,
    pub date: String,
    pub body: String,
}

impl SiteProfile {
    /// Compiles a configuration entry
    ///
    /// # Returns
    ///
    /// * `Ok(SiteProfile)` - The pattern compiled and the pagination
    ///   template contains `{index}`
    /// * `Err(ConfigError)` - Otherwise
    pub fn from_entry(entry: &SiteEntry) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&entry.url_pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!(
                "site '{}': url-pattern '{}': {}",
                entry.name, entry.url_pattern, e
            ))
        })?;

        if !entry.pagination_button.contains(SLOT_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "site '{}': pagination-button must contain {}",
                entry.name, SLOT_PLACEHOLDER
            )));
        }

        Ok(Self {
            name: entry.name.clone(),
            pattern,
            blocked_url: entry.blocked_url.clone(),
            product_name: entry.product_name.clone(),
            review_count: entry.review_count.clone(),
            sort_recent: entry.sort_recent.clone(),
            pagination_button: entry.pagination_button.clone(),
            review_items: entry.review_items.clone(),
            rating: entry.rating.clone(),
            date: entry.date.clone(),
            body: entry.body.clone(),
        })
    }

    /// Returns true if `url` belongs to this site family
    pub fn matches(&self, url: &Url) -> bool {
        self.pattern.is_match(url.as_str())
    }

    /// Locator of the paginator control at `slot` (1-based)
    pub fn pagination_selector(&self, slot: u32) -> String {
        self.pagination_button
            .replace(SLOT_PLACEHOLDER, &slot.to_string())
    }

    /// Returns true if `location` is the site's "you are blocked" page
    pub fn is_blocked_location(&self, location: &str) -> bool {
        match &self.blocked_url {
            Some(blocked) => location.trim_end_matches('/') == blocked.trim_end_matches('/'),
            None => false,
        }
    }
}
