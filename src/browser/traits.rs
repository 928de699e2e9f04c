//! Browser capability traits and error types
//!
//! This module defines the narrow interface the crawler drives a remote page
//! through. Site-specific locators are passed in as CSS selectors; how a
//! backend loads pages and resolves clicks is its own business.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while driving a browser handle
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element cannot be clicked: {0}")]
    NotClickable(String),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("No page has been loaded yet")]
    NotLoaded,

    #[error("Browser handle already released")]
    Released,

    #[error("Browser launch failed: {0}")]
    Launch(String),

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Result type for browser operations
pub type BrowserResult<T> = Result<T, BrowserError>;

/// One isolated automation handle
///
/// A handle is owned by exactly one session attempt. Every wait inside the
/// handle is bounded by the timeout it was opened with. Dropping a handle
/// must release its resources; [`Browser::close`] is the graceful path.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Reference to one element found by [`Browser::find_visible_items`]
    type Item: Send + Sync;

    /// Navigates to `url`
    async fn load(&mut self, url: &Url) -> BrowserResult<()>;

    /// Location currently displayed, after any redirects
    async fn current_location(&self) -> BrowserResult<String>;

    /// Waits for `expected` elements matching `selector`
    ///
    /// Returns whatever matched once `expected` elements are present or the
    /// handle's timeout elapsed; callers compare the count themselves.
    async fn find_visible_items(
        &mut self,
        selector: &str,
        expected: usize,
    ) -> BrowserResult<Vec<Self::Item>>;

    /// Waits for the element matching `selector` and clicks it
    async fn click(&mut self, selector: &str) -> BrowserResult<()>;

    /// Text of the first element under `item` matching `sub_selector`
    async fn read_text(&self, item: &Self::Item, sub_selector: &str) -> BrowserResult<String>;

    /// Text of the first element on the page matching `selector`
    async fn read_first_text(&self, selector: &str) -> BrowserResult<Option<String>>;

    /// Releases the handle
    async fn close(&mut self) -> BrowserResult<()>;
}

/// Allocates browser handles for sessions
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    type Browser: Browser + 'static;

    /// Opens one handle whose waits are bounded by `timeout`
    async fn open(&self, timeout: Duration) -> BrowserResult<Self::Browser>;
}
