//! Integration tests for the crawler
//!
//! The orchestrator scenarios run a scripted extractor through the public
//! worker pool. The full-run tests use wiremock to serve a small review site
//! and drive it with the HTTP backend end to end.

use async_trait::async_trait;
use review_pager::browser::HttpBrowserFactory;
use review_pager::config::{parse_config, CrawlJob, JobOverrides, SortMode};
use review_pager::crawler::{
    run_crawl, AbandonReason, CrawlSignals, PageExtractor, PageOutcome, PageResult,
    SharedBackoffState, WorkerPool,
};
use review_pager::{Dataset, PagerError, Record, TaskState};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_SIZE: usize = 20;

/// Creates a configuration with one site profile for the mock server
fn create_test_config(blocked_url: &str, output_dir: &str) -> String {
    format!(
        r##"
[crawl]
concurrency = 2
initial-backoff-secs = 5

[output]
directory = "{output_dir}"

[[site]]
name = "mock-shop"
url-pattern = '^http://127\.0\.0\.1:[0-9]+/catalog/[0-9]+'
blocked-url = "{blocked_url}"
product-name = "h2.title"
review-count = "#review-count"
sort-recent = "a.sort-recent"
pagination-button = ".pager a:nth-child({{index}})"
review-items = "ul.reviews > li"
rating = ".rating"
date = ".date"
body = ".body"
"##
    )
}

fn create_job(resource: &str, blocked_url: &str, dir: &TempDir, overrides: JobOverrides) -> CrawlJob {
    let output_dir = dir.path().join("out");
    let config = parse_config(&create_test_config(
        blocked_url,
        &output_dir.display().to_string().replace('\\', "/"),
    ))
    .expect("Failed to parse test config");
    CrawlJob::from_config(&config, resource, overrides).expect("Failed to build job")
}

/// Scripted per-page behaviour for the orchestrator scenarios
#[derive(Default)]
struct ScriptedExtractor {
    transient_once: HashSet<u32>,
    blocked: HashSet<u32>,
    attempts: Mutex<Vec<u32>>,
}

#[async_trait]
impl PageExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        job: Arc<CrawlJob>,
        page_index: u32,
        _backoff: &SharedBackoffState,
    ) -> review_pager::Result<PageResult> {
        let first_attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let first = !attempts.contains(&page_index);
            attempts.push(page_index);
            first
        };

        // Later pages finish first so ordering cannot come from completion
        tokio::time::sleep(std::time::Duration::from_millis(10 * (4 - page_index as u64))).await;

        if self.blocked.contains(&page_index) {
            return Err(PagerError::Blocked {
                location: "https://shop.example.com/blocked.html".to_string(),
            });
        }
        if first_attempt && self.transient_once.contains(&page_index) {
            return Err(PagerError::UnexpectedItemCount {
                expected: job.page_size,
                found: 3,
            });
        }

        Ok((0..job.page_size)
            .map(|i| Record {
                rating: 4,
                date: format!("page {}", page_index),
                body: format!("review {}", i),
            })
            .collect())
    }
}

fn scenario_job(dir: &TempDir) -> Arc<CrawlJob> {
    Arc::new(create_job(
        "http://127.0.0.1:9/catalog/7",
        "http://127.0.0.1:9/blocked.html",
        dir,
        JobOverrides::default(),
    ))
}

#[tokio::test]
async fn test_transient_failure_on_one_page_still_yields_every_row() {
    let dir = TempDir::new().unwrap();
    let job = scenario_job(&dir);
    let extractor = ScriptedExtractor {
        transient_once: [2].into_iter().collect(),
        ..ScriptedExtractor::default()
    };
    let backoff = SharedBackoffState::new(job.initial_backoff_secs);
    let pool = WorkerPool::new(Arc::new(extractor), backoff.clone(), CrawlSignals::new());

    let outcomes = pool.run(Arc::clone(&job), &[1, 2, 3]).await.unwrap();
    let dataset = Dataset::from_outcomes(outcomes);

    assert_eq!(dataset.len(), 3 * PAGE_SIZE);
    let pages: Vec<&str> = dataset
        .records()
        .chunks(PAGE_SIZE)
        .map(|chunk| chunk[0].date.as_str())
        .collect();
    assert_eq!(pages, vec!["page 1", "page 2", "page 3"]);
    assert!(dataset
        .records()
        .chunks(PAGE_SIZE)
        .all(|chunk| chunk.iter().all(|r| r.date == chunk[0].date)));
    assert!(backoff.current() >= job.initial_backoff_secs + 1);
}

#[tokio::test]
async fn test_blocked_page_is_dropped_without_failing_the_run() {
    let dir = TempDir::new().unwrap();
    let job = scenario_job(&dir);
    let extractor = ScriptedExtractor {
        blocked: [2].into_iter().collect(),
        ..ScriptedExtractor::default()
    };
    let pool = WorkerPool::new(
        Arc::new(extractor),
        SharedBackoffState::new(job.initial_backoff_secs),
        CrawlSignals::new(),
    );

    let outcomes = pool.run(Arc::clone(&job), &[1, 2, 3]).await.unwrap();

    assert_eq!(
        outcomes[1],
        PageOutcome::Abandoned {
            reason: AbandonReason::Blocked,
            attempts: 1
        }
    );
    let dataset = Dataset::from_outcomes(outcomes);
    assert_eq!(dataset.len(), 2 * PAGE_SIZE);
    assert_eq!(dataset.records()[0].date, "page 1");
    assert_eq!(dataset.records()[PAGE_SIZE].date, "page 3");
}

/// Review listing for one page of the mock site
///
/// The pager mimics a fixed ten-link window: slot 11 advances to page 11.
fn review_page(base: &str, page: u32, total: u32) -> String {
    let items: String = (0..PAGE_SIZE)
        .map(|i| {
            format!(
                r#"<li><span class="rating">Rating {}</span><span class="date">24.03.{:02}</span><p class="body">page {} review {}</p></li>"#,
                i % 5 + 1,
                page,
                page,
                i
            )
        })
        .collect();
    let pager: String = (1..=11)
        .map(|slot| {
            format!(
                r#"<a href="{}/catalog/1/reviews?sort=recent&page={}">{}</a>"#,
                base, slot, slot
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <h2 class="title">Crunchy Kibble</h2>
        <span id="review-count">{total}</span>
        <a class="sort-recent" href="{base}/catalog/1/reviews?sort=recent&page=1">Recent</a>
        <ul class="reviews">{items}</ul>
        <div class="pager">{pager}</div>
        </body></html>"#
    )
}

async fn mount_review_site(server: &MockServer, total: u32) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/catalog/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(review_page(&base, 1, total))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    for page in 1..=11 {
        Mock::given(method("GET"))
            .and(path("/catalog/1/reviews"))
            .and(query_param("page", page.to_string()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(review_page(&base, page, total))
                    .insert_header("content-type", "text/html"),
            )
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_run_over_http() {
    let server = MockServer::start().await;
    mount_review_site(&server, 60).await;
    let dir = TempDir::new().unwrap();

    let resource = format!("{}/catalog/1", server.uri());
    let blocked = format!("{}/blocked.html", server.uri());
    let job = create_job(&resource, &blocked, &dir, JobOverrides::default());
    assert_eq!(job.sort_mode, SortMode::Recent);

    let report = run_crawl(job, HttpBrowserFactory::default(), CrawlSignals::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.display_name, "Crunchy Kibble");
    assert_eq!(report.total_items, Some(60));
    assert_eq!(report.page_count, 3);
    assert_eq!(report.rows_written, 3 * PAGE_SIZE);
    assert_eq!(report.count_state(TaskState::Succeeded), 3);
    assert_eq!(
        report.output_path,
        dir.path().join("out").join("Crunchy Kibble.csv")
    );

    let mut reader = csv::Reader::from_path(&report.output_path).unwrap();
    assert_eq!(reader.headers().unwrap(), vec!["rating", "date", "body"]);
    let bodies: Vec<String> = reader
        .records()
        .map(|r| r.unwrap()[2].to_string())
        .collect();
    assert_eq!(bodies.len(), 60);
    assert_eq!(bodies[0], "page 1 review 0");
    assert_eq!(bodies[20], "page 2 review 0");
    assert_eq!(bodies[59], "page 3 review 19");
}

#[tokio::test]
async fn test_page_count_override_reaches_next_window() {
    let server = MockServer::start().await;
    mount_review_site(&server, 999).await;
    let dir = TempDir::new().unwrap();

    let resource = format!("{}/catalog/1", server.uri());
    let blocked = format!("{}/blocked.html", server.uri());
    let mut job = create_job(
        &resource,
        &blocked,
        &dir,
        JobOverrides {
            max_pages: Some(11),
            concurrency: Some(4),
            ..JobOverrides::default()
        },
    );
    job.output_path = Some(dir.path().join("kibble.csv"));

    let report = run_crawl(job, HttpBrowserFactory::default(), CrawlSignals::new())
        .await
        .expect("Crawl failed");

    assert_eq!(report.page_count, 11);
    assert_eq!(report.rows_written, 11 * PAGE_SIZE);

    let mut reader = csv::Reader::from_path(dir.path().join("kibble.csv")).unwrap();
    let last = reader.records().last().unwrap().unwrap();
    assert_eq!(&last[2], "page 11 review 19");
}

#[tokio::test]
async fn test_blocked_resource_fails_discovery() {
    let server = MockServer::start().await;
    let blocked = format!("{}/blocked.html", server.uri());

    Mock::given(method("GET"))
        .and(path("/catalog/1"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", blocked.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocked.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let resource = format!("{}/catalog/1", server.uri());
    let job = create_job(&resource, &blocked, &dir, JobOverrides::default());

    let result = run_crawl(job, HttpBrowserFactory::default(), CrawlSignals::new()).await;

    assert!(matches!(result, Err(PagerError::Blocked { .. })));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_missing_review_count_fails_discovery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h2 class=\"title\">Empty</h2></body></html>"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let resource = format!("{}/catalog/1", server.uri());
    let blocked = format!("{}/blocked.html", server.uri());
    let job = create_job(&resource, &blocked, &dir, JobOverrides::default());

    let result = run_crawl(job, HttpBrowserFactory::default(), CrawlSignals::new()).await;

    assert!(matches!(result, Err(PagerError::DiscoveryFailed(_))));
}
