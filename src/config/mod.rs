//! Configuration module for Review-Pager
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and turning them into an immutable [`CrawlJob`].
//!
//! # Example
//!
//! ```no_run
//! use review_pager::config::{load_config, CrawlJob, JobOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("review-pager.toml")).unwrap();
//! let job = CrawlJob::from_config(
//!     &config,
//!     "https://shop.example.com/catalog/42",
//!     JobOverrides::default(),
//! )
//! .unwrap();
//! println!("Crawling with {} workers", job.concurrency);
//! ```

mod job;
mod parser;
mod types;
mod validation;

// Re-export types
pub use job::{CrawlJob, JobOverrides};
pub use types::{BackendKind, Config, CrawlSettings, OutputSettings, SiteEntry, SortMode};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
