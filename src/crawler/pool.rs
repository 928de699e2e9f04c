//! Fixed-size worker pool for page tasks
//!
//! Workers pull `(position, page_index)` pairs from one shared queue and run
//! each through the retry loop. Outcomes are placed by submission position,
//! so the returned order never depends on which worker finished first.

use crate::config::CrawlJob;
use crate::crawler::backoff::SharedBackoffState;
use crate::crawler::retry::{PageExtractor, RetryOrchestrator};
use crate::crawler::signals::CrawlSignals;
use crate::crawler::task::{PageOutcome, PageTask};
use crate::{PagerError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Runs page tasks on `job.concurrency` parallel workers
pub struct WorkerPool<E> {
    orchestrator: Arc<RetryOrchestrator<E>>,
}

impl<E: PageExtractor + 'static> WorkerPool<E> {
    pub fn new(extractor: Arc<E>, backoff: SharedBackoffState, signals: CrawlSignals) -> Self {
        Self {
            orchestrator: Arc::new(RetryOrchestrator::new(extractor, backoff, signals)),
        }
    }

    /// Runs one task per entry of `page_indices`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageOutcome>)` - One outcome per index, in submission order
    /// * `Err(PagerError::Pool)` - A worker panicked
    /// * `Err(PagerError)` - A task hit a fatal error; remaining workers are stopped
    pub async fn run(&self, job: Arc<CrawlJob>, page_indices: &[u32]) -> Result<Vec<PageOutcome>> {
        let total = page_indices.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let queue: VecDeque<(usize, u32)> = page_indices.iter().copied().enumerate().collect();
        let queue = Arc::new(Mutex::new(queue));
        let completed = Arc::new(AtomicUsize::new(0));

        let workers = job.concurrency.clamp(1, total);
        tracing::info!("Starting {} worker(s) for {} page(s)", workers, total);

        let mut set = JoinSet::new();
        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let completed = Arc::clone(&completed);
            let orchestrator = Arc::clone(&self.orchestrator);
            let job = Arc::clone(&job);

            set.spawn(async move {
                let mut finished = Vec::new();
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some((position, page_index)) = next else {
                        break;
                    };

                    tracing::debug!("Worker {} took page {}", worker_id, page_index);
                    let outcome = orchestrator
                        .run(PageTask::new(Arc::clone(&job), page_index))
                        .await?;

                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::info!(
                        "Progress: {}/{} pages done (page {} {})",
                        done,
                        total,
                        page_index,
                        outcome.state()
                    );
                    finished.push((position, outcome));
                }
                Ok::<_, PagerError>(finished)
            });
        }

        let mut slots: Vec<Option<PageOutcome>> = (0..total).map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            let finished =
                joined.map_err(|e| PagerError::Pool(format!("worker task failed: {}", e)))??;
            for (position, outcome) in finished {
                slots[position] = Some(outcome);
            }
        }

        slots
            .into_iter()
            .zip(page_indices)
            .map(|(slot, page_index)| {
                slot.ok_or_else(|| {
                    PagerError::Pool(format!("no outcome recorded for page {}", page_index))
                })
            })
            .collect()
    }
}
