//! Process-level interrupt and cancellation signals
//!
//! An interrupt abandons only the page tasks in flight when it arrives;
//! tasks started afterwards run normally, so the pool still drains.
//! Cancellation stops the run: every task still to start resolves to
//! `Aborted` without opening a session.

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shared handle to the run's interrupt and cancel signals
#[derive(Debug, Clone)]
pub struct CrawlSignals {
    interrupts: Arc<watch::Sender<u64>>,
    cancel: CancellationToken,
}

impl CrawlSignals {
    pub fn new() -> Self {
        let (interrupts, _) = watch::channel(0);
        Self {
            interrupts: Arc::new(interrupts),
            cancel: CancellationToken::new(),
        }
    }

    /// Abandons every task currently in flight
    pub fn interrupt(&self) {
        self.interrupts.send_modify(|generation| *generation += 1);
    }

    /// Stops the run
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the run is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Starts watching for interrupts raised from now on
    pub fn watch_interrupts(&self) -> InterruptWatch {
        InterruptWatch {
            receiver: self.interrupts.subscribe(),
        }
    }
}

impl Default for CrawlSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// Observes interrupts raised after it was created
#[derive(Debug)]
pub struct InterruptWatch {
    receiver: watch::Receiver<u64>,
}

impl InterruptWatch {
    /// Resolves at the next interrupt
    pub async fn interrupted(&mut self) {
        if self.receiver.changed().await.is_err() {
            // Sender gone: no interrupt can arrive any more
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupt_reaches_existing_watchers() {
        let signals = CrawlSignals::new();
        let mut watch = signals.watch_interrupts();

        signals.interrupt();

        tokio::time::timeout(Duration::from_secs(1), watch.interrupted())
            .await
            .expect("interrupt not observed");
    }

    #[tokio::test]
    async fn test_watchers_ignore_earlier_interrupts() {
        let signals = CrawlSignals::new();
        signals.interrupt();

        let mut late = signals.watch_interrupts();
        let result = tokio::time::timeout(Duration::from_millis(50), late.interrupted()).await;
        assert!(result.is_err(), "stale interrupt leaked into a new watcher");
    }

    #[tokio::test]
    async fn test_cancel() {
        let signals = CrawlSignals::new();
        let clone = signals.clone();
        assert!(!signals.is_cancelled());

        clone.cancel();

        assert!(signals.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), signals.cancelled())
            .await
            .expect("cancellation not observed");
    }
}
