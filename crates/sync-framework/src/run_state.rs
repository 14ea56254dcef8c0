//! # Run & Cancellation State
//!
//! Every engine instance shares one [`RunState`] between all of its actors: a
//! `running` flag checked at the top of each loop iteration, plus a
//! [`CancellationToken`] that interrupts any wait currently in progress.
//!
//! A state is single-use. Once stopped it never becomes running again, so an engine
//! that needs another run is started afresh.

use crate::error::Cancelled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct Inner {
    running: AtomicBool,
    cancel: CancellationToken,
}

/// Shared stop signal for a group of actors.
///
/// Cloning is cheap; all clones observe the same state. `stop` may be called from
/// any thread, any number of times.
#[derive(Debug, Clone)]
pub struct RunState {
    inner: Arc<Inner>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                running: AtomicBool::new(true),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Clears the running flag, then fires the cancellation token.
    ///
    /// The flag is cleared first so that an actor woken by the token always sees
    /// `is_running() == false` at the top of its loop.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::Release);
        self.inner.cancel.cancel();
    }

    /// Completes once [`stop`](Self::stop) has been called.
    pub async fn cancelled(&self) {
        self.inner.cancel.cancelled().await
    }

    /// Sleeps for `duration` unless stopped first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        if duration.is_zero() {
            return if self.is_running() { Ok(()) } else { Err(Cancelled) };
        }
        tokio::select! {
            biased;
            _ = self.inner.cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stop_is_idempotent_and_shared() {
        let state = RunState::new();
        let other = state.clone();
        assert!(other.is_running());

        state.stop();
        state.stop();

        assert!(!other.is_running());
        other.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_returns_early_on_stop() {
        let state = RunState::new();
        let stopper = state.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            stopper.stop();
        });

        let started = tokio::time::Instant::now();
        let result = state.sleep(Duration::from_secs(60)).await;

        assert_eq!(result, Err(Cancelled));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn zero_sleep_reports_stop() {
        let state = RunState::new();
        assert_eq!(state.sleep(Duration::ZERO).await, Ok(()));
        state.stop();
        assert_eq!(state.sleep(Duration::ZERO).await, Err(Cancelled));
    }
}
