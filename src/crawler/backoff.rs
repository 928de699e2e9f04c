//! Crawl-wide backoff signal
//!
//! One counter shared by every worker. Each transient failure anywhere in
//! the pool bumps it, and each new session sizes its wait timeout from it,
//! so patience grows for the whole crawl as soon as instability shows up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Monotonically non-decreasing counter, in seconds
///
/// Clones share the same counter.
#[derive(Debug, Clone)]
pub struct SharedBackoffState {
    value: Arc<AtomicU64>,
}

impl SharedBackoffState {
    /// Creates a counter starting at `initial`
    pub fn new(initial: u64) -> Self {
        Self {
            value: Arc::new(AtomicU64::new(initial)),
        }
    }

    /// Current value
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Increments the counter and returns the new value
    pub fn penalize(&self) -> u64 {
        self.value.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Wait timeout for a session opened now
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.current())
    }
}
