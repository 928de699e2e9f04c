use crate::config::types::{Config, CrawlSettings, OutputSettings, SiteEntry};
use crate::site::{SiteProfile, SLOT_PLACEHOLDER};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Upper bound on concurrent browser sessions
pub(crate) const MAX_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_settings(&config.crawl)?;
    validate_output_settings(&config.output)?;
    validate_sites(&config.site)?;
    Ok(())
}

/// Validates crawl settings
fn validate_crawl_settings(config: &CrawlSettings) -> Result<(), ConfigError> {
    if !(1..=MAX_CONCURRENCY).contains(&config.concurrency) {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page-size must be >= 1".to_string(),
        ));
    }

    if config.page_cap < 1 {
        return Err(ConfigError::Validation("page-cap must be >= 1".to_string()));
    }

    if config.group_size < 1 {
        return Err(ConfigError::Validation(
            "group-size must be >= 1".to_string(),
        ));
    }

    if config.initial_backoff_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "initial-backoff-secs must be >= 1, got {}",
            config.initial_backoff_secs
        )));
    }

    if let Some(0) = config.max_attempts {
        return Err(ConfigError::Validation(
            "max-attempts must be >= 1 when set".to_string(),
        ));
    }

    if let Some(max_backoff) = config.max_backoff_secs {
        if max_backoff < config.initial_backoff_secs {
            return Err(ConfigError::Validation(format!(
                "max-backoff-secs ({}) is below initial-backoff-secs ({})",
                max_backoff, config.initial_backoff_secs
            )));
        }
    }

    Ok(())
}

/// Validates output settings
fn validate_output_settings(config: &OutputSettings) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if let Some(path) = &config.report_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "report-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates site profiles
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for entry in sites {
        if entry.name.is_empty() {
            return Err(ConfigError::Validation(
                "site name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name '{}'",
                entry.name
            )));
        }

        // Compiles the URL pattern and checks the pagination template
        SiteProfile::from_entry(entry)?;

        if let Some(blocked) = &entry.blocked_url {
            Url::parse(blocked).map_err(|e| {
                ConfigError::InvalidUrl(format!("Invalid blocked-url '{}': {}", blocked, e))
            })?;
        }

        validate_selector(&entry.name, "review-count", &entry.review_count)?;
        validate_selector(
            &entry.name,
            "pagination-button",
            &entry.pagination_button.replace(SLOT_PLACEHOLDER, "1"),
        )?;
        validate_selector(&entry.name, "review-items", &entry.review_items)?;
        validate_selector(&entry.name, "rating", &entry.rating)?;
        validate_selector(&entry.name, "date", &entry.date)?;
        validate_selector(&entry.name, "body", &entry.body)?;
        if let Some(selector) = &entry.product_name {
            validate_selector(&entry.name, "product-name", selector)?;
        }
        if let Some(selector) = &entry.sort_recent {
            validate_selector(&entry.name, "sort-recent", selector)?;
        }
    }

    Ok(())
}

/// Checks that a locator is a well-formed CSS selector
fn validate_selector(site: &str, key: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "site '{}': {} cannot be empty",
            site, key
        )));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::Validation(format!(
            "site '{}': {} is not a valid CSS selector ({}): {:?}",
            site, key, selector, e
        ))
    })?;

    Ok(())
}
