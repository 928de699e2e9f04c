//! One-shot probe that sizes the crawl
//!
//! Before any page task runs, a single session loads the resource, reads
//! its display name and total review count, and derives how many pages to
//! crawl. There is no retry: any failure here stops the run.

use crate::browser::{Browser, BrowserFactory};
use crate::config::CrawlJob;
use crate::crawler::backoff::SharedBackoffState;
use crate::crawler::session::ExtractionSession;
use crate::site::fallback_display_name;
use crate::{PagerError, Result};
use std::sync::Arc;

/// What the probe learned about the resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Product name for the output file, or a name derived from the URL
    pub display_name: String,

    /// Review count shown by the site, if it could be read
    pub total_items: Option<u64>,

    /// Pages to crawl
    pub page_count: u32,
}

/// Probes `job.resource` with one session
///
/// An explicit page-count override on the job replaces the computed count;
/// the probe still runs so the display name is known.
///
/// # Returns
///
/// * `Ok(Discovery)` - The resource was read
/// * `Err(PagerError::Blocked)` - The site redirected to its blocked page
/// * `Err(PagerError::DiscoveryFailed)` - No usable review count and no override
pub async fn probe<F: BrowserFactory>(
    factory: &F,
    job: Arc<CrawlJob>,
    backoff: &SharedBackoffState,
) -> Result<Discovery> {
    let mut session = ExtractionSession::open(factory, Arc::clone(&job), backoff).await?;
    session.load_resource().await?;

    let browser = session.browser()?;

    let display_name = match &job.site.product_name {
        Some(selector) => browser.read_first_text(selector).await?,
        None => None,
    }
    .filter(|name| !name.trim().is_empty())
    .unwrap_or_else(|| fallback_display_name(&job.resource));

    let count_text = browser.read_first_text(&job.site.review_count).await?;
    let total_items = count_text.as_deref().and_then(parse_count);

    session.close().await?;

    let page_count = match (job.max_pages, total_items) {
        (Some(pages), _) => pages,
        (None, Some(total)) => page_count(total, job.page_size, job.page_cap),
        (None, None) => {
            return Err(PagerError::DiscoveryFailed(match count_text {
                Some(text) => format!("review count {:?} is not a number", text),
                None => format!(
                    "no element matches review count selector '{}'",
                    job.site.review_count
                ),
            }))
        }
    };

    tracing::info!(
        "Discovered '{}': {} reviews, {} page(s) to crawl",
        display_name,
        total_items.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
        page_count
    );

    Ok(Discovery {
        display_name,
        total_items,
        page_count,
    })
}

/// `min(ceil(total / page_size), cap)`
pub fn page_count(total: u64, page_size: usize, cap: u32) -> u32 {
    let page_size = page_size.max(1) as u64;
    let pages = total.div_ceil(page_size);
    pages.min(u64::from(cap)) as u32
}

/// First number in `text`, ignoring thousands separators
fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobOverrides;
    use crate::testing::{self, FakeFactory, FakeSite, BLOCKED};
    use std::collections::HashMap;

    fn site(texts: &[(&str, &str)]) -> FakeSite {
        FakeSite {
            texts: texts
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            ..FakeSite::default()
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 20, 100), 0);
        assert_eq!(page_count(1, 20, 100), 1);
        assert_eq!(page_count(20, 20, 100), 1);
        assert_eq!(page_count(21, 20, 100), 2);
        assert_eq!(page_count(60, 20, 100), 3);
        assert_eq!(page_count(1_000_000, 20, 100), 100);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("Reviews (57)"), Some(57));
        assert_eq!(parse_count("12,345,678 reviews"), Some(12_345_678));
        assert_eq!(parse_count("none yet"), None);
    }

    #[tokio::test]
    async fn test_probe_reads_name_and_count() {
        let factory = FakeFactory::new(site(&[("h2.title", "Crunchy Kibble"), ("#review-count", "1,234")]));

        let discovery = probe(&factory, testing::job(), &SharedBackoffState::new(10))
            .await
            .unwrap();

        assert_eq!(
            discovery,
            Discovery {
                display_name: "Crunchy Kibble".to_string(),
                total_items: Some(1234),
                page_count: 62,
            }
        );
        assert_eq!(factory.log.closed(), 1);
    }

    #[tokio::test]
    async fn test_probe_caps_page_count() {
        let factory = FakeFactory::new(site(&[("#review-count", "99,999")]));

        let discovery = probe(&factory, testing::job(), &SharedBackoffState::new(10))
            .await
            .unwrap();

        assert_eq!(discovery.page_count, 100);
        assert_eq!(discovery.display_name, "42");
    }

    #[tokio::test]
    async fn test_probe_override_skips_computation() {
        let factory = FakeFactory::new(site(&[("h2.title", "Kibble")]));
        let job = testing::job_with(JobOverrides {
            max_pages: Some(3),
            ..JobOverrides::default()
        });

        let discovery = probe(&factory, job, &SharedBackoffState::new(10))
            .await
            .unwrap();

        assert_eq!(discovery.page_count, 3);
        assert_eq!(discovery.total_items, None);
        assert_eq!(discovery.display_name, "Kibble");
    }

    #[tokio::test]
    async fn test_probe_missing_count_fails() {
        let factory = FakeFactory::new(site(&[("h2.title", "Kibble")]));

        let result = probe(&factory, testing::job(), &SharedBackoffState::new(10)).await;

        assert!(matches!(result, Err(PagerError::DiscoveryFailed(_))));
        // The handle was still released
        assert_eq!(factory.log.dropped(), 1);
    }

    #[tokio::test]
    async fn test_probe_blocked() {
        let mut blocked = site(&[("#review-count", "10")]);
        blocked.landing = Some(BLOCKED.to_string());
        let factory = FakeFactory::new(blocked);

        let result = probe(&factory, testing::job(), &SharedBackoffState::new(10)).await;

        assert!(matches!(result, Err(PagerError::Blocked { .. })));
    }
}
