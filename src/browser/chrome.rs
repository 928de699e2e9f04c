//! Headless Chromium backend
//!
//! Each handle launches its own browser process so sessions never share
//! cookies, storage or tabs. Waits poll the DOM until the handle's timeout.

use crate::browser::traits::{Browser, BrowserError, BrowserFactory, BrowserResult};
use async_trait::async_trait;
use chromiumoxide::{Browser as CdpBrowser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

/// Interval between DOM polls while waiting for elements
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn protocol_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Protocol(e.to_string())
}

/// Launches [`ChromeBrowser`] handles
#[derive(Debug, Clone, Default)]
pub struct ChromeBrowserFactory {
    /// Show the browser window (used with handle retention for debugging)
    pub headful: bool,

    /// Chromium binary to launch instead of the auto-detected one
    pub executable: Option<PathBuf>,
}

#[async_trait]
impl BrowserFactory for ChromeBrowserFactory {
    type Browser = ChromeBrowser;

    async fn open(&self, timeout: Duration) -> BrowserResult<ChromeBrowser> {
        let mut builder = BrowserConfig::builder().request_timeout(timeout);
        if self.headful {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("CDP handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await.map_err(protocol_error)?;

        Ok(ChromeBrowser {
            browser,
            page,
            handler_task,
            timeout,
        })
    }
}

/// One Chromium process with a single tab
pub struct ChromeBrowser {
    browser: CdpBrowser,
    page: Page,
    handler_task: JoinHandle<()>,
    timeout: Duration,
}

impl ChromeBrowser {
    async fn wait_for_element(&self, selector: &str) -> BrowserResult<Element> {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(_) if Instant::now() < deadline => tokio::time::sleep(POLL_INTERVAL).await,
                Err(_) => {
                    return Err(BrowserError::Timeout {
                        what: selector.to_string(),
                        timeout: self.timeout,
                    })
                }
            }
        }
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    type Item = Element;

    async fn load(&mut self, url: &Url) -> BrowserResult<()> {
        self.page
            .goto(url.as_str())
            .await
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn current_location(&self) -> BrowserResult<String> {
        self.page
            .url()
            .await
            .map_err(protocol_error)?
            .ok_or(BrowserError::NotLoaded)
    }

    async fn find_visible_items(
        &mut self,
        selector: &str,
        expected: usize,
    ) -> BrowserResult<Vec<Element>> {
        let deadline = Instant::now() + self.timeout;
        loop {
            let found = self
                .page
                .find_elements(selector)
                .await
                .unwrap_or_default();
            if found.len() >= expected || Instant::now() >= deadline {
                return Ok(found);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        let element = self.wait_for_element(selector).await?;
        element.click().await.map_err(protocol_error)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn read_text(&self, item: &Element, sub_selector: &str) -> BrowserResult<String> {
        let element = item
            .find_element(sub_selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(sub_selector.to_string()))?;
        Ok(element
            .inner_text()
            .await
            .map_err(protocol_error)?
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    async fn read_first_text(&self, selector: &str) -> BrowserResult<Option<String>> {
        let element = match self.wait_for_element(selector).await {
            Ok(element) => element,
            Err(BrowserError::Timeout { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(element
            .inner_text()
            .await
            .map_err(protocol_error)?
            .map(|text| text.trim().to_string()))
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.browser.close().await.map_err(protocol_error)?;
        self.browser.wait().await.map_err(protocol_error)?;
        self.handler_task.abort();
        Ok(())
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        // Dropping the CDP browser kills its child process
        self.handler_task.abort();
    }
}
