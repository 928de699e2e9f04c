//! Crawl coordinator - control flow of one run
//!
//! This module ties the pieces of a run together:
//! - Probing the resource for its display name and page count
//! - Fanning the pages out over the worker pool
//! - Aggregating the ordered outcomes into the dataset
//! - Writing the CSV and the run report

use crate::browser::BrowserFactory;
use crate::config::CrawlJob;
use crate::crawler::backoff::SharedBackoffState;
use crate::crawler::discovery::{probe, Discovery};
use crate::crawler::pool::WorkerPool;
use crate::crawler::retry::SessionExtractor;
use crate::crawler::signals::CrawlSignals;
use crate::crawler::task::AbandonReason;
use crate::output::{write_csv, write_markdown_report, CrawlReport, Dataset, PageSummary};
use crate::state::TaskState;
use crate::{PagerError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Runs one crawl job against one browser backend
pub struct Coordinator<F> {
    job: Arc<CrawlJob>,
    extractor: Arc<SessionExtractor<F>>,
    backoff: SharedBackoffState,
    signals: CrawlSignals,
}

impl<F: BrowserFactory + 'static> Coordinator<F> {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `job` - The crawl job
    /// * `factory` - Opens one isolated browser handle per session
    /// * `signals` - Interrupt and cancel signals, usually wired to Ctrl-C
    pub fn new(job: CrawlJob, factory: F, signals: CrawlSignals) -> Self {
        let backoff = SharedBackoffState::new(job.initial_backoff_secs);
        Self {
            job: Arc::new(job),
            extractor: Arc::new(SessionExtractor::new(factory)),
            backoff,
            signals,
        }
    }

    pub fn backoff(&self) -> &SharedBackoffState {
        &self.backoff
    }

    /// Reads the display name and page count without crawling any page
    pub async fn discover(&self) -> Result<Discovery> {
        probe(self.extractor.factory(), Arc::clone(&self.job), &self.backoff).await
    }

    /// Runs the crawl end to end
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The dataset was written; some pages may be
    ///   missing, see the report
    /// * `Err(PagerError)` - Discovery failed or was interrupted, the pool
    ///   failed, or the output could not be written
    pub async fn run(&self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} (site '{}', sort {:?}, {} worker(s))",
            self.job.resource,
            self.job.site.name,
            self.job.sort_mode,
            self.job.concurrency
        );

        let mut interrupts = self.signals.watch_interrupts();
        let discovery = tokio::select! {
            biased;
            _ = self.signals.cancelled() => return Err(PagerError::UserInterrupt),
            _ = interrupts.interrupted() => return Err(PagerError::UserInterrupt),
            discovery = self.discover() => discovery?,
        };
        let page_indices: Vec<u32> = (1..=discovery.page_count).collect();

        let pool = WorkerPool::new(
            Arc::clone(&self.extractor),
            self.backoff.clone(),
            self.signals.clone(),
        );
        let outcomes = pool.run(Arc::clone(&self.job), &page_indices).await?;

        let pages: Vec<PageSummary> = page_indices
            .iter()
            .zip(&outcomes)
            .map(|(index, outcome)| PageSummary::from_outcome(*index, outcome))
            .collect();
        let dataset = Dataset::from_outcomes(outcomes);

        let output_path = self.job.output_path_for(&discovery.display_name);
        write_csv(&dataset, &output_path)?;

        let report = CrawlReport {
            resource: self.job.resource.to_string(),
            display_name: discovery.display_name,
            output_path,
            started_at,
            finished_at: Utc::now(),
            total_items: discovery.total_items,
            page_count: discovery.page_count,
            final_backoff: self.backoff.current(),
            rows_written: dataset.len(),
            pages,
        };
        log_missing_pages(&report);

        if let Some(path) = &self.job.report_path {
            write_markdown_report(&report, path)?;
            tracing::info!("Report written to {}", path.display());
        }

        tracing::info!(
            "Crawl complete: {} rows from {} page(s) in {}s",
            report.rows_written,
            report.page_count,
            report.duration_seconds()
        );
        Ok(report)
    }
}

/// Warns about pages that contributed no rows
fn log_missing_pages(report: &CrawlReport) {
    if !report.is_partial() {
        return;
    }

    let missing = report.page_count as usize - report.count_state(TaskState::Succeeded);
    tracing::warn!(
        "{} of {} page(s) produced no records (blocked: {}, interrupted: {}, retries exhausted: {}, aborted: {})",
        missing,
        report.page_count,
        report.count_reason(AbandonReason::Blocked),
        report.count_reason(AbandonReason::Interrupted),
        report.count_reason(AbandonReason::RetriesExhausted),
        report.count_state(TaskState::Aborted)
    );
}

/// Runs a complete crawl
///
/// This is the main entry point for a run. It will:
/// 1. Probe the resource for its page count
/// 2. Extract every page on the worker pool
/// 3. Write the dataset and the report
pub async fn run_crawl<F>(job: CrawlJob, factory: F, signals: CrawlSignals) -> Result<CrawlReport>
where
    F: BrowserFactory + 'static,
{
    Coordinator::new(job, factory, signals).run().await
}
