//! Browser module: the automation capability the crawler drives
//!
//! This module contains:
//! - The `Browser` / `BrowserFactory` capability traits
//! - An HTTP backend for server-rendered paginators
//! - A headless Chromium backend (feature `chrome`)

mod dom;
mod http;
mod traits;

#[cfg(feature = "chrome")]
mod chrome;

pub use http::{build_http_client, HttpBrowser, HttpBrowserFactory, DEFAULT_USER_AGENT};
pub use traits::{Browser, BrowserError, BrowserFactory, BrowserResult};

#[cfg(feature = "chrome")]
pub use chrome::{ChromeBrowser, ChromeBrowserFactory};
