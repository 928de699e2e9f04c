//! Crawler module: the paginated extraction orchestrator
//!
//! This module contains the core of a run:
//! - Navigation planning for the fixed-window paginator
//! - The crawl-wide backoff signal
//! - One-page extraction sessions and the retry loop around them
//! - The worker pool and the discovery probe
//! - Overall crawl coordination

mod backoff;
mod coordinator;
mod discovery;
mod locator;
mod pool;
mod retry;
mod session;
mod signals;
mod task;

pub use backoff::SharedBackoffState;
pub use coordinator::{run_crawl, Coordinator};
pub use discovery::{page_count, probe, Discovery};
pub use locator::{plan, NavigationAction, NavigationPlan};
pub use pool::WorkerPool;
pub use retry::{PageExtractor, RetryOrchestrator, RetryPolicy, SessionExtractor};
pub use session::ExtractionSession;
pub use signals::{CrawlSignals, InterruptWatch};
pub use task::{AbandonReason, PageOutcome, PageResult, PageTask};
