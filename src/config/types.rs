use serde::Deserialize;

/// Main configuration structure for Review-Pager
///
/// Every section is optional; a missing file behaves like an empty one
/// except that no site profile is known.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub site: Vec<SiteEntry>,
}

/// Order in which the remote site lists its reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// The site's default relevance ranking
    Ranking,
    /// Newest reviews first
    #[default]
    Recent,
}

/// Which automation backend opens the per-task sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Plain HTTP requests; clicks follow the element's `href`
    #[default]
    Http,
    /// Headless Chromium (requires the `chrome` feature)
    Chrome,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// Number of parallel workers
    pub concurrency: usize,

    /// Review ordering requested before paging
    pub sort: SortMode,

    /// Number of reviews a full page shows
    pub page_size: usize,

    /// Hard upper bound on pages crawled
    pub page_cap: u32,

    /// Number of direct page links the paginator shows at once
    pub group_size: u32,

    /// Starting value of the shared backoff counter (seconds)
    pub initial_backoff_secs: u64,

    /// Give up on a page after this many attempts (unbounded when absent)
    pub max_attempts: Option<u32>,

    /// Give up on a page once the shared backoff reaches this value
    pub max_backoff_secs: Option<u64>,

    pub backend: BackendKind,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            sort: SortMode::Recent,
            page_size: 20,
            page_cap: 100,
            group_size: 10,
            initial_backoff_secs: 10,
            max_attempts: None,
            max_backoff_secs: None,
            backend: BackendKind::Http,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputSettings {
    /// Directory for the default `<display name>.csv` output file
    pub directory: String,

    /// Path of the markdown run report (not written when absent)
    pub report_path: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: "out".to_string(),
            report_path: None,
        }
    }
}

/// Locators for one family of review pages
///
/// All locators are CSS selectors. `rating`, `date` and `body` are relative
/// to one review item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteEntry {
    /// Short name used in logs
    pub name: String,

    /// Regular expression a resource URL must match to use this profile
    pub url_pattern: String,

    /// Location the site redirects to when it refuses the crawler
    #[serde(default)]
    pub blocked_url: Option<String>,

    /// Element holding the product's display name
    #[serde(default)]
    pub product_name: Option<String>,

    /// Element holding the total review count
    pub review_count: String,

    /// Control switching the listing to newest-first
    #[serde(default)]
    pub sort_recent: Option<String>,

    /// Paginator slot template; `{index}` is replaced by the 1-based slot
    pub pagination_button: String,

    /// One element per review on the current page
    pub review_items: String,

    pub rating: String,
    pub date: String,
    pub body: String,
}
