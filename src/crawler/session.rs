//! One navigation-and-extraction attempt on an isolated browser handle
//!
//! A session owns exactly one handle for the lifetime of one attempt. The
//! handle is released on every exit path, including when the attempt future
//! is dropped mid-flight; with the job's debug flag set it is retained
//! instead so the page can be inspected afterwards.

use crate::browser::{Browser, BrowserError, BrowserFactory, BrowserResult};
use crate::config::{CrawlJob, SortMode};
use crate::crawler::backoff::SharedBackoffState;
use crate::crawler::locator::plan;
use crate::crawler::task::PageResult;
use crate::output::Record;
use crate::{PagerError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Owns a browser handle and releases or retains it when done
struct HandleGuard<B> {
    browser: Option<B>,
    retain: bool,
}

impl<B: Browser> HandleGuard<B> {
    fn new(browser: B, retain: bool) -> Self {
        Self {
            browser: Some(browser),
            retain,
        }
    }

    fn get(&self) -> Result<&B> {
        self.browser
            .as_ref()
            .ok_or(PagerError::Browser(BrowserError::Released))
    }

    fn get_mut(&mut self) -> Result<&mut B> {
        self.browser
            .as_mut()
            .ok_or(PagerError::Browser(BrowserError::Released))
    }

    /// Closes the handle, or leaks it when retaining
    async fn release(mut self) -> BrowserResult<()> {
        match self.browser.take() {
            Some(browser) if self.retain => {
                tracing::info!("Debug mode: leaving browser handle open");
                std::mem::forget(browser);
                Ok(())
            }
            Some(mut browser) => browser.close().await,
            None => Ok(()),
        }
    }
}

impl<B> Drop for HandleGuard<B> {
    fn drop(&mut self) {
        if let Some(browser) = self.browser.take() {
            if self.retain {
                std::mem::forget(browser);
            }
            // Otherwise dropping the handle tears it down
        }
    }
}

/// A single attempt at one page
pub struct ExtractionSession<B> {
    guard: HandleGuard<B>,
    job: Arc<CrawlJob>,
    timeout: Duration,
}

impl<B: Browser> ExtractionSession<B> {
    /// Allocates a fresh handle sized by the current backoff
    ///
    /// The timeout is read once here and stays fixed for the session, even
    /// if other workers raise the backoff meanwhile.
    pub async fn open<F>(factory: &F, job: Arc<CrawlJob>, backoff: &SharedBackoffState) -> Result<Self>
    where
        F: BrowserFactory<Browser = B>,
    {
        let timeout = backoff.timeout();
        let browser = factory.open(timeout).await?;
        let retain = job.debug;

        Ok(Self {
            guard: HandleGuard::new(browser, retain),
            job,
            timeout,
        })
    }

    /// Wait timeout fixed at open
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn browser(&self) -> Result<&B> {
        self.guard.get()
    }

    /// Loads the job's resource and checks for the blocked sentinel
    pub async fn load_resource(&mut self) -> Result<()> {
        let browser = self.guard.get_mut()?;
        browser.load(&self.job.resource).await?;

        let location = browser.current_location().await?;
        if self.job.site.is_blocked_location(&location) {
            return Err(PagerError::Blocked { location });
        }
        Ok(())
    }

    /// Navigates to `page_index` and reads its records, consuming the session
    ///
    /// # Returns
    ///
    /// * `Ok(PageResult)` - Exactly `page_size` records in page order
    /// * `Err(PagerError::Blocked)` - The site redirected to its blocked page
    /// * `Err(PagerError)` - Any other failure; the handle is released either way
    pub async fn execute(mut self, page_index: u32) -> Result<PageResult> {
        let result = self.navigate_and_read(page_index).await;
        if let Err(e) = self.close().await {
            tracing::warn!("Failed to close browser after page {}: {}", page_index, e);
        }
        result
    }

    /// Releases the handle (or retains it in debug mode)
    pub async fn close(self) -> Result<()> {
        self.guard.release().await?;
        Ok(())
    }

    async fn navigate_and_read(&mut self, page_index: u32) -> Result<PageResult> {
        let actions = plan(page_index, self.job.group_size)?;

        self.load_resource().await?;

        let job = Arc::clone(&self.job);
        let browser = self.guard.get_mut()?;

        if job.sort_mode == SortMode::Recent {
            if let Some(selector) = &job.site.sort_recent {
                browser.click(selector).await?;
            }
        }

        for action in &actions {
            tracing::trace!("Page {}: {}", page_index, action);
            browser
                .click(&job.site.pagination_selector(action.slot()))
                .await?;
        }

        let items = browser
            .find_visible_items(&job.site.review_items, job.page_size)
            .await?;
        if items.len() != job.page_size {
            return Err(PagerError::UnexpectedItemCount {
                expected: job.page_size,
                found: items.len(),
            });
        }

        let mut records = Vec::with_capacity(items.len());
        for item in &items {
            let rating = browser.read_text(item, &job.site.rating).await?;
            let date = browser.read_text(item, &job.site.date).await?;
            let body = browser.read_text(item, &job.site.body).await?;
            records.push(Record {
                rating: parse_rating(&rating)?,
                date,
                body,
            });
        }

        tracing::debug!("Page {}: read {} records", page_index, records.len());
        Ok(records)
    }
}

/// First integer in a rating text such as "Rating 4"
fn parse_rating(text: &str) -> Result<i64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits
        .parse()
        .map_err(|_| PagerError::Extraction(format!("no numeric rating in {:?}", text)))
}
