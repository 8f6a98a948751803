//! Input debouncing: hold the latest text until input has been quiet for a while.

use std::time::Duration;

use tokio::time::Instant;

/// Keeps only the most recent input and releases it once no newer input
/// arrived for `quiet`.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record new input, restarting the quiet period.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.quiet));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take pending input immediately, without waiting.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    /// Wait until the pending input has settled and return it. Never resolves while
    /// nothing is pending. Cancel-safe: dropping the future keeps the pending input.
    pub async fn settled(&mut self) -> T {
        loop {
            match &self.pending {
                None => std::future::pending::<()>().await,
                Some((_, deadline)) => tokio::time::sleep_until(*deadline).await,
            }
            if let Some(value) = self.take() {
                return value;
            }
        }
    }
}
