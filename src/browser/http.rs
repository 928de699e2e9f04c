//! HTTP browser backend
//!
//! Drives server-rendered paginators with plain HTTP requests:
//! - loading a page is a GET that follows redirects
//! - clicking an element follows its `href`, resolved against the current
//!   location
//! - element queries run against the last response body
//!
//! Every handle gets its own client so no connection or state is shared
//! between sessions.

use crate::browser::dom;
use crate::browser::traits::{Browser, BrowserError, BrowserFactory, BrowserResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Default user agent for the HTTP backend
pub const DEFAULT_USER_AGENT: &str = concat!("review-pager/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client for one handle
///
/// `timeout` bounds every request the handle makes.
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Opens [`HttpBrowser`] handles
#[derive(Debug, Clone)]
pub struct HttpBrowserFactory {
    user_agent: String,
}

impl HttpBrowserFactory {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpBrowserFactory {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl BrowserFactory for HttpBrowserFactory {
    type Browser = HttpBrowser;

    async fn open(&self, timeout: Duration) -> BrowserResult<HttpBrowser> {
        let client = build_http_client(&self.user_agent, timeout)?;
        Ok(HttpBrowser {
            client,
            location: None,
            body: String::new(),
        })
    }
}

/// One HTTP-backed handle: a client plus the last page it loaded
pub struct HttpBrowser {
    client: Client,
    location: Option<Url>,
    body: String,
}

impl HttpBrowser {
    fn location(&self) -> BrowserResult<&Url> {
        self.location.as_ref().ok_or(BrowserError::NotLoaded)
    }

    async fn fetch(&mut self, url: &Url) -> BrowserResult<()> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(BrowserError::Status {
                status: status.as_u16(),
                url: final_url.to_string(),
            });
        }

        self.body = response.text().await?;
        self.location = Some(final_url);
        Ok(())
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    /// Outer HTML of the matched element
    type Item = String;

    async fn load(&mut self, url: &Url) -> BrowserResult<()> {
        self.fetch(url).await
    }

    async fn current_location(&self) -> BrowserResult<String> {
        Ok(self.location()?.to_string())
    }

    async fn find_visible_items(
        &mut self,
        selector: &str,
        _expected: usize,
    ) -> BrowserResult<Vec<String>> {
        // A static response is complete once received; there is nothing to wait for.
        self.location()?;
        dom::select_outer_html(&self.body, selector)
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        let target = dom::resolve_click_target(&self.body, selector, self.location()?)?;
        self.fetch(&target).await
    }

    async fn read_text(&self, item: &String, sub_selector: &str) -> BrowserResult<String> {
        dom::fragment_text(item, sub_selector)?
            .ok_or_else(|| BrowserError::ElementNotFound(sub_selector.to_string()))
    }

    async fn read_first_text(&self, selector: &str) -> BrowserResult<Option<String>> {
        self.location()?;
        dom::select_first_text(&self.body, selector)
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.location = None;
        self.body.clear();
        Ok(())
    }
}
