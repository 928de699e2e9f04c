//! Run report
//!
//! The dataset cannot tell an abandoned page from an empty one, so the
//! report records how every page ended. It is printed at the end of a run
//! and can also be exported as markdown.

use crate::crawler::{AbandonReason, PageOutcome};
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// How one page ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    pub page_index: u32,
    pub state: TaskState,
    pub reason: Option<AbandonReason>,
    pub attempts: u32,
    pub records: usize,
}

impl PageSummary {
    pub fn from_outcome(page_index: u32, outcome: &PageOutcome) -> Self {
        let reason = match outcome {
            PageOutcome::Abandoned { reason, .. } => Some(*reason),
            _ => None,
        };
        Self {
            page_index,
            state: outcome.state(),
            reason,
            attempts: outcome.attempts(),
            records: outcome.records().len(),
        }
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub resource: String,
    pub display_name: String,
    pub output_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Review count read during discovery
    pub total_items: Option<u64>,

    pub page_count: u32,

    /// Shared backoff value when the run ended (seconds)
    pub final_backoff: u64,

    pub rows_written: usize,
    pub pages: Vec<PageSummary>,
}

impl CrawlReport {
    pub fn count_state(&self, state: TaskState) -> usize {
        self.pages.iter().filter(|p| p.state == state).count()
    }

    pub fn count_reason(&self, reason: AbandonReason) -> usize {
        self.pages
            .iter()
            .filter(|p| p.reason == Some(reason))
            .count()
    }

    /// Attempts beyond the first, summed over all pages
    pub fn total_retries(&self) -> u32 {
        self.pages
            .iter()
            .map(|p| p.attempts.saturating_sub(1))
            .sum()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// True when any page ended without records
    pub fn is_partial(&self) -> bool {
        self.pages.iter().any(|p| p.state != TaskState::Succeeded)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Overview:");
    println!("  Resource: {}", report.resource);
    println!("  Display name: {}", report.display_name);
    if let Some(total) = report.total_items {
        println!("  Reviews on site: {}", total);
    }
    println!("  Pages crawled: {}", report.page_count);
    println!("  Rows written: {}", report.rows_written);
    println!("  Output: {}", report.output_path.display());
    println!("  Duration: {}s", report.duration_seconds());
    println!("  Final backoff: {}s", report.final_backoff);
    println!();

    println!("Pages by State:");
    for state in [
        TaskState::Succeeded,
        TaskState::Abandoned,
        TaskState::Aborted,
    ] {
        let count = report.count_state(state);
        if count > 0 {
            println!("  {}: {}", state, count);
        }
    }
    println!("  Retries: {}", report.total_retries());
    println!();

    let incomplete: Vec<_> = report
        .pages
        .iter()
        .filter(|p| p.state != TaskState::Succeeded)
        .collect();
    if !incomplete.is_empty() {
        println!("Pages without records ({}):", incomplete.len());
        for page in incomplete {
            match page.reason {
                Some(reason) => println!("  - page {}: {} ({})", page.page_index, page.state, reason),
                None => println!("  - page {}: {}", page.page_index, page.state),
            }
        }
        println!();
    }
}
