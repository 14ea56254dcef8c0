//! Forks: exclusive resources with no payload.

use super::DiningEvent;
use sync_framework::Probe;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// One fork on the table. At most one philosopher holds it at a time.
#[derive(Debug)]
pub struct Fork {
    id: usize,
    lock: Mutex<()>,
}

impl Fork {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            lock: Mutex::new(()),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Waits until the fork is free, then holds it until the guard is dropped.
    ///
    /// This wait deliberately ignores the stop signal: a philosopher stuck here
    /// stays stuck until its task is aborted.
    pub async fn pick_up<'a>(&'a self, philosopher: usize, probe: &'a Probe<DiningEvent>) -> HeldFork<'a> {
        let guard = self.lock.lock().await;
        probe.emit(DiningEvent::ForkAcquired {
            philosopher,
            fork: self.id,
        });
        HeldFork {
            fork: self.id,
            philosopher,
            probe,
            _guard: guard,
        }
    }
}

/// A fork in someone's hand. Putting it down is dropping it.
#[derive(Debug)]
pub struct HeldFork<'a> {
    fork: usize,
    philosopher: usize,
    probe: &'a Probe<DiningEvent>,
    _guard: MutexGuard<'a, ()>,
}

impl HeldFork<'_> {
    pub fn fork(&self) -> usize {
        self.fork
    }
}

impl Drop for HeldFork<'_> {
    fn drop(&mut self) {
        // Emitted before the guard field drops, so a release is always traced
        // before the next holder's acquisition.
        self.probe.emit(DiningEvent::ForkReleased {
            philosopher: self.philosopher,
            fork: self.fork,
        });
        debug!(id = self.philosopher, fork = self.fork, "Fork released");
    }
}
