//! Immutable crawl job descriptor
//!
//! A `CrawlJob` is assembled once from the file configuration, the resource
//! URL and the command-line overrides, then shared read-only by every
//! component of the run.

use crate::config::types::{BackendKind, Config, SortMode};
use crate::config::validation::MAX_CONCURRENCY;
use crate::crawler::RetryPolicy;
use crate::site::{parse_resource_url, resolve_site, sanitize_file_name, SiteProfile};
use crate::ConfigError;
use std::path::PathBuf;
use url::Url;

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct JobOverrides {
    pub sort: Option<SortMode>,
    pub concurrency: Option<usize>,
    pub max_pages: Option<u32>,
    pub output_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub debug: bool,
}

/// Everything a run needs to know about what to crawl and how
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// The review page to crawl
    pub resource: Url,

    /// Locators for the site family `resource` belongs to
    pub site: SiteProfile,

    pub sort_mode: SortMode,

    /// Number of parallel workers (>= 1)
    pub concurrency: usize,

    /// Records on a full page
    pub page_size: usize,

    /// Hard upper bound on the number of pages
    pub page_cap: u32,

    /// Direct links visible in one paginator window
    pub group_size: u32,

    /// Explicit page count, skipping the computed one
    pub max_pages: Option<u32>,

    /// Keep browser handles open after each attempt for inspection
    pub debug: bool,

    /// Starting value of the shared backoff counter (seconds)
    pub initial_backoff_secs: u64,

    pub retry: RetryPolicy,

    pub backend: BackendKind,

    /// Explicit output file; otherwise derived from the display name
    pub output_path: Option<PathBuf>,

    /// Directory for the derived output file
    pub output_dir: PathBuf,

    pub report_path: Option<PathBuf>,
}

impl CrawlJob {
    /// Builds a job for `resource` from the configuration and overrides
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlJob)` - The resource matched a site profile and all
    ///   values are in range
    /// * `Err(ConfigError)` - Bad URL, no matching profile, or an override
    ///   out of range
    pub fn from_config(
        config: &Config,
        resource: &str,
        overrides: JobOverrides,
    ) -> Result<Self, ConfigError> {
        let resource = parse_resource_url(resource)?;

        let profiles = config
            .site
            .iter()
            .map(SiteProfile::from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let site = resolve_site(&profiles, &resource)
            .cloned()
            .ok_or_else(|| ConfigError::NoMatchingSite(resource.to_string()))?;

        let concurrency = overrides.concurrency.unwrap_or(config.crawl.concurrency);
        if !(1..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(ConfigError::Validation(format!(
                "concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, concurrency
            )));
        }

        if let Some(0) = overrides.max_pages {
            return Err(ConfigError::Validation(
                "max pages must be >= 1".to_string(),
            ));
        }

        Ok(Self {
            resource,
            site,
            sort_mode: overrides.sort.unwrap_or(config.crawl.sort),
            concurrency,
            page_size: config.crawl.page_size,
            page_cap: config.crawl.page_cap,
            group_size: config.crawl.group_size,
            max_pages: overrides.max_pages,
            debug: overrides.debug,
            initial_backoff_secs: config.crawl.initial_backoff_secs,
            retry: RetryPolicy {
                max_attempts: config.crawl.max_attempts,
                max_backoff: config.crawl.max_backoff_secs,
            },
            backend: overrides.backend.unwrap_or(config.crawl.backend),
            output_path: overrides.output_path,
            output_dir: PathBuf::from(&config.output.directory),
            report_path: overrides
                .report_path
                .or_else(|| config.output.report_path.as_ref().map(PathBuf::from)),
        })
    }

    /// Resolves where the dataset is written
    ///
    /// An explicit output path wins; otherwise `<output_dir>/<name>.csv`.
    pub fn output_path_for(&self, display_name: &str) -> PathBuf {
        match &self.output_path {
            Some(path) => path.clone(),
            None => self
                .output_dir
                .join(format!("{}.csv", sanitize_file_name(display_name))),
        }
    }
}
