//! # Cancellable Counting Semaphore
//!
//! The only cross-actor signalling primitive the engines use. It wraps
//! [`tokio::sync::Semaphore`] but uses it the textbook way: `wait` consumes a permit
//! for good and `signal` creates a new one, so the count is free to move between
//! actors instead of being tied to an RAII guard.

use crate::error::Cancelled;
use crate::run_state::RunState;

/// A counting semaphore with cancellable `wait` and unbounded `signal`.
#[derive(Debug)]
pub struct Semaphore {
    permits: tokio::sync::Semaphore,
}

impl Semaphore {
    pub fn new(initial: usize) -> Self {
        Self {
            permits: tokio::sync::Semaphore::new(initial),
        }
    }

    /// Decrements the count, suspending while it is zero.
    ///
    /// Returns `Err(Cancelled)` as soon as `stop` fires, even if a permit is
    /// available at the same instant.
    pub async fn wait(&self, stop: &RunState) -> Result<(), Cancelled> {
        tokio::select! {
            biased;
            _ = stop.cancelled() => Err(Cancelled),
            permit = self.permits.acquire() => {
                // The inner semaphore is never closed.
                permit.map_err(|_| Cancelled)?.forget();
                Ok(())
            }
        }
    }

    /// Decrements the count if it is positive, without suspending.
    pub fn try_wait(&self) -> bool {
        match self.permits.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Increments the count, waking one waiter if any.
    pub fn signal(&self) {
        self.permits.add_permits(1);
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
