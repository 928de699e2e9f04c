//! In-memory browser and job fixtures for unit tests

use crate::browser::{Browser, BrowserError, BrowserFactory, BrowserResult};
use crate::config::{Config, CrawlJob, JobOverrides, SiteEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub(crate) const RESOURCE: &str = "https://shop.example.com/catalog/42";
pub(crate) const BLOCKED: &str = "https://shop.example.com/blocked.html";

pub(crate) fn site_entry() -> SiteEntry {
    SiteEntry {
        name: "shop".to_string(),
        url_pattern: r"^https://shop\.example\.com/catalog/[0-9]+".to_string(),
        blocked_url: Some(BLOCKED.to_string()),
        product_name: Some("h2.title".to_string()),
        review_count: "#review-count".to_string(),
        sort_recent: Some("a.sort-recent".to_string()),
        pagination_button: ".pager a:nth-child({index})".to_string(),
        review_items: "li.review".to_string(),
        rating: ".rating".to_string(),
        date: ".date".to_string(),
        body: ".body".to_string(),
    }
}

pub(crate) fn job_with(overrides: JobOverrides) -> Arc<CrawlJob> {
    let config = Config {
        site: vec![site_entry()],
        ..Config::default()
    };
    Arc::new(CrawlJob::from_config(&config, RESOURCE, overrides).unwrap())
}

pub(crate) fn job() -> Arc<CrawlJob> {
    job_with(JobOverrides::default())
}

/// What every fake handle observes after loading
#[derive(Debug, Clone)]
pub(crate) struct FakeSite {
    /// Location reported after `load`; the requested URL when `None`
    pub landing: Option<String>,
    pub items: usize,
    /// Replaces the generated rating text of every item
    pub rating_text: Option<String>,
    /// Results of `read_first_text` by selector
    pub texts: HashMap<String, String>,
    /// `load` never completes
    pub hang_on_load: bool,
    /// `close` reports a protocol error
    pub fail_close: bool,
}

impl Default for FakeSite {
    fn default() -> Self {
        Self {
            landing: None,
            items: 20,
            rating_text: None,
            texts: HashMap::new(),
            hang_on_load: false,
            fail_close: false,
        }
    }
}

/// Calls observed across all handles from one factory
#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub clicks: Mutex<Vec<String>>,
    pub timeouts: Mutex<Vec<Duration>>,
    pub closed: AtomicUsize,
    pub dropped: AtomicUsize,
}

impl FakeLog {
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeFactory {
    pub site: FakeSite,
    pub log: Arc<FakeLog>,
}

impl FakeFactory {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            log: Arc::new(FakeLog::default()),
        }
    }
}

#[async_trait]
impl BrowserFactory for FakeFactory {
    type Browser = FakeBrowser;

    async fn open(&self, timeout: Duration) -> BrowserResult<FakeBrowser> {
        self.log.timeouts.lock().unwrap().push(timeout);
        Ok(FakeBrowser {
            site: self.site.clone(),
            log: Arc::clone(&self.log),
            location: None,
        })
    }
}

pub(crate) struct FakeBrowser {
    site: FakeSite,
    log: Arc<FakeLog>,
    location: Option<String>,
}

#[async_trait]
impl Browser for FakeBrowser {
    /// Position of the item on the page
    type Item = usize;

    async fn load(&mut self, url: &Url) -> BrowserResult<()> {
        if self.site.hang_on_load {
            return std::future::pending().await;
        }
        let landing = self.site.landing.clone().unwrap_or_else(|| url.to_string());
        self.location = Some(landing);
        Ok(())
    }

    async fn current_location(&self) -> BrowserResult<String> {
        self.location.clone().ok_or(BrowserError::NotLoaded)
    }

    async fn find_visible_items(
        &mut self,
        _selector: &str,
        _expected: usize,
    ) -> BrowserResult<Vec<usize>> {
        Ok((0..self.site.items).collect())
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        self.log.clicks.lock().unwrap().push(selector.to_string());
        Ok(())
    }

    async fn read_text(&self, item: &usize, sub_selector: &str) -> BrowserResult<String> {
        match (sub_selector, &self.site.rating_text) {
            (".rating", Some(text)) => Ok(text.clone()),
            (".rating", None) => Ok(format!("Rating {}", item % 5 + 1)),
            _ => Ok(format!("{} {}", sub_selector.trim_start_matches('.'), item)),
        }
    }

    async fn read_first_text(&self, selector: &str) -> BrowserResult<Option<String>> {
        Ok(self.site.texts.get(selector).cloned())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.log.closed.fetch_add(1, Ordering::SeqCst);
        if self.site.fail_close {
            return Err(BrowserError::Protocol("target already gone".to_string()));
        }
        Ok(())
    }
}

impl Drop for FakeBrowser {
    fn drop(&mut self) {
        self.log.dropped.fetch_add(1, Ordering::SeqCst);
    }
}
