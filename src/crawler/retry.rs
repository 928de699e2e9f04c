//! Retry loop around one page task
//!
//! Every page task runs through [`RetryOrchestrator::run`], which keeps
//! opening fresh sessions until one of them succeeds or a terminal signal
//! arrives:
//! - blocked by the site, or interrupted by the user: abandon, no retry
//! - cancelled: abort
//! - anything else: bump the shared backoff and try again
//!
//! Errors that stem from the job itself (bad input, configuration) are not
//! retried and are returned to the caller.

use crate::browser::BrowserFactory;
use crate::config::CrawlJob;
use crate::crawler::backoff::SharedBackoffState;
use crate::crawler::session::ExtractionSession;
use crate::crawler::signals::CrawlSignals;
use crate::crawler::task::{AbandonReason, PageOutcome, PageResult, PageTask};
use crate::state::TaskState;
use crate::{PagerError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Optional bounds on the retry loop
///
/// The default retries forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed for one task, counting the first
    pub max_attempts: Option<u32>,

    /// Shared backoff value (seconds) at which a task stops retrying
    pub max_backoff: Option<u64>,
}

impl RetryPolicy {
    /// Whether another attempt may follow `attempts` failed ones at `backoff`
    pub fn allows_retry(&self, attempts: u32, backoff: u64) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
            && self.max_backoff.map_or(true, |max| backoff < max)
    }
}

/// Performs one attempt at a page
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn extract(
        &self,
        job: Arc<CrawlJob>,
        page_index: u32,
        backoff: &SharedBackoffState,
    ) -> Result<PageResult>;
}

/// Extracts pages with a fresh [`ExtractionSession`] per attempt
pub struct SessionExtractor<F> {
    factory: F,
}

impl<F: BrowserFactory> SessionExtractor<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }
}

#[async_trait]
impl<F: BrowserFactory> PageExtractor for SessionExtractor<F> {
    async fn extract(
        &self,
        job: Arc<CrawlJob>,
        page_index: u32,
        backoff: &SharedBackoffState,
    ) -> Result<PageResult> {
        let session = ExtractionSession::open(&self.factory, job, backoff).await?;
        session.execute(page_index).await
    }
}

/// Drives page tasks to a final outcome
pub struct RetryOrchestrator<E> {
    extractor: Arc<E>,
    backoff: SharedBackoffState,
    signals: CrawlSignals,
}

impl<E: PageExtractor> RetryOrchestrator<E> {
    pub fn new(extractor: Arc<E>, backoff: SharedBackoffState, signals: CrawlSignals) -> Self {
        Self {
            extractor,
            backoff,
            signals,
        }
    }

    /// Runs `task` until it succeeds, is abandoned or is aborted
    ///
    /// # Returns
    ///
    /// * `Ok(PageOutcome)` - The task reached a final state
    /// * `Err(PagerError)` - A fatal error that retrying cannot fix
    pub async fn run(&self, task: PageTask) -> Result<PageOutcome> {
        let page = task.page_index;
        let policy = task.job.retry;
        let mut state = TaskState::Attempting;
        let mut attempts = 0;
        // Subscribed once so an interrupt between attempts is not lost
        let mut interrupts = self.signals.watch_interrupts();

        loop {
            if self.signals.is_cancelled() {
                state.transition(TaskState::Aborted)?;
                tracing::debug!("Page {} aborted before attempt {}", page, attempts + 1);
                return Ok(PageOutcome::Aborted { attempts });
            }

            attempts += 1;

            let result = tokio::select! {
                biased;
                _ = self.signals.cancelled() => {
                    state.transition(TaskState::Aborted)?;
                    tracing::debug!("Page {} aborted during attempt {}", page, attempts);
                    return Ok(PageOutcome::Aborted { attempts });
                }
                _ = interrupts.interrupted() => Err(PagerError::UserInterrupt),
                result = self.extractor.extract(Arc::clone(&task.job), page, &self.backoff) => result,
            };

            let error = match result {
                Ok(records) => {
                    state.transition(TaskState::Succeeded)?;
                    tracing::debug!(
                        "Page {} succeeded after {} attempt(s) with {} records",
                        page,
                        attempts,
                        records.len()
                    );
                    return Ok(PageOutcome::Succeeded { records, attempts });
                }
                Err(e) => e,
            };

            let reason = if error.is_terminal() {
                tracing::warn!("Page {} abandoned: {}", page, error);
                match error {
                    PagerError::Blocked { .. } => AbandonReason::Blocked,
                    _ => AbandonReason::Interrupted,
                }
            } else if !error.is_transient() {
                return Err(error);
            } else if !policy.allows_retry(attempts, self.backoff.current()) {
                tracing::warn!(
                    "Page {} abandoned after {} attempt(s), retries exhausted: {}",
                    page,
                    attempts,
                    error
                );
                AbandonReason::RetriesExhausted
            } else {
                state.transition(TaskState::Attempting)?;
                let backoff = self.backoff.penalize();
                tracing::warn!(
                    "Page {} attempt {} failed: {}; retrying with backoff {}s",
                    page,
                    attempts,
                    error,
                    backoff
                );
                continue;
            };

            state.transition(TaskState::Abandoned)?;
            return Ok(PageOutcome::Abandoned { reason, attempts });
        }
    }
}
