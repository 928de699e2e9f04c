//! Review-Pager: a paginated review extractor
//!
//! This crate walks a fixed-window paginator page by page, fanning the pages
//! out over a pool of isolated browser sessions, and collects the reviews of
//! every page into one ordered dataset.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod state;

#[cfg(test)]
mod testing;

use thiserror::Error;

/// Main error type for Review-Pager operations
#[derive(Debug, Error)]
pub enum PagerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Blocked by remote site (landed on {location})")]
    Blocked { location: String },

    #[error("Interrupted by user")]
    UserInterrupt,

    #[error("Expected {expected} items on page, found {found}")]
    UnexpectedItemCount { expected: usize, found: usize },

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("Worker pool error: {0}")]
    Pool(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

impl PagerError {
    /// Returns true for conditions that end a page task without a retry
    ///
    /// The task is abandoned and contributes an empty result; the rest of
    /// the crawl carries on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Blocked { .. } | Self::UserInterrupt)
    }

    /// Returns true for errors that must stop the whole run
    ///
    /// Retrying these cannot succeed because they stem from the job itself,
    /// not from the remote site.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::InvalidInput(_)
                | Self::InvalidTransition { .. }
                | Self::Pool(_)
                | Self::DiscoveryFailed(_)
        )
    }

    /// Returns true for session failures that the retry loop absorbs
    pub fn is_transient(&self) -> bool {
        !self.is_terminal() && !self.is_fatal()
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),

    #[error("No site profile matches {0}")]
    NoMatchingSite(String),
}

/// Result type alias for Review-Pager operations
pub type Result<T> = std::result::Result<T, PagerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, CrawlJob, SortMode};
pub use crawler::{plan, NavigationAction, NavigationPlan, SharedBackoffState};
pub use output::{Dataset, Record};
pub use state::TaskState;
