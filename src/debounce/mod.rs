use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Delays an action until a burst of triggers has paused
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action` after the delay. Scheduling again before it fires
    /// supersedes it; the handle resolves to whether the action ran.
    pub fn schedule<F, Fut>(&self, action: F) -> JoinHandle<bool>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.next_ticket();
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            sleep(delay).await;
            if !Self::is_current(&generation, ticket) {
                return false;
            }
            action().await;
            true
        })
    }

    /// Drop whatever is pending without scheduling anything new
    pub fn cancel(&self) {
        self.next_ticket();
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(generation: &AtomicU64, ticket: u64) -> bool {
        generation.load(Ordering::SeqCst) == ticket
    }
}
