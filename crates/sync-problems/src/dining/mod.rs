//! # Dining Philosophers
//!
//! `N` philosophers sit at a round table with `N` forks between them. Fork `i` is
//! the *left* fork of philosopher `i` and the *right* fork of philosopher
//! `i - 1 (mod N)`, so neighbours share exactly one fork. A philosopher loops
//! `Thinking → first fork → second fork → Eating → release both`.
//!
//! ## Strategies
//!
//! The order in which the two forks are taken is the whole point of the engine:
//!
//! - [`Strategy::Unordered`] - everyone takes left, then right. If all philosophers
//!   grab their left fork at about the same time, each one then waits forever for a
//!   fork held by its neighbour: a circular wait. Nothing recovers from it, and a
//!   [`stop`](sync_framework::EngineHandle::stop) cannot reach a philosopher blocked
//!   on a fork, so such a run only ends when the coordinator's
//!   [`shutdown`](sync_framework::EngineHandle::shutdown) deadline aborts it. This
//!   strategy is kept on purpose to demonstrate the failure.
//! - [`Strategy::ParityOrdered`] - even philosophers take left then right, odd ones
//!   take right then left. Two neighbours can never each hold the fork the other
//!   needs first, so no cycle of waits can close and every run stops promptly.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use sync_framework::{EngineHandle, Probe};
//! use sync_problems::dining::{self, DiningConfig, Strategy};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = DiningConfig {
//!         strategy: Strategy::ParityOrdered,
//!         ..DiningConfig::fast()
//!     };
//!     let handle = dining::start(config, Probe::disabled()).unwrap();
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//!
//!     let report = handle.shutdown(Duration::from_millis(500)).await.unwrap();
//!     assert_eq!(report.meals.len(), 5);
//! }
//! ```

pub mod fork;
pub mod philosopher;

pub use fork::{Fork, HeldFork};
pub use philosopher::Philosopher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use sync_framework::{ActorGroup, ConfigError, CoordError, DelayRange, EngineHandle, Probe, RunState};
use tracing::info;

pub const ENGINE: &str = "dining-philosophers";

/// Fork acquisition order, selectable per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Left then right for everyone. Deadlock-prone.
    Unordered,
    /// Left then right for even ids, right then left for odd ids. Deadlock-free.
    ParityOrdered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningConfig {
    pub philosophers: usize,
    pub strategy: Strategy,
    pub think: DelayRange,
    pub eat: DelayRange,
    /// Pause while holding the first fork. Widens the window in which every
    /// philosopher holds exactly one fork.
    pub fork_gap: DelayRange,
    pub seed: Option<u64>,
}

impl Default for DiningConfig {
    fn default() -> Self {
        Self {
            philosophers: 5,
            strategy: Strategy::ParityOrdered,
            think: DelayRange::new(500, 1500),
            eat: DelayRange::new(300, 1000),
            fork_gap: DelayRange::new(50, 200),
            seed: None,
        }
    }
}

impl DiningConfig {
    /// Default table with millisecond-scale delays, for short runs.
    pub fn fast() -> Self {
        Self {
            think: DelayRange::new(1, 5),
            eat: DelayRange::new(1, 5),
            fork_gap: DelayRange::new(0, 2),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers < 2 {
            return Err(ConfigError::TooFewActors {
                role: "philosophers",
                min: 2,
                got: self.philosophers,
            });
        }
        self.think.validate("think")?;
        self.eat.validate("eat")?;
        self.fork_gap.validate("fork_gap")
    }
}

/// State transitions reported through the engine's [`Probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiningEvent {
    Thinking { philosopher: usize },
    ForkAcquired { philosopher: usize, fork: usize },
    Eating { philosopher: usize },
    ForkReleased { philosopher: usize, fork: usize },
}

/// Shared state of one run: the ring of forks plus per-philosopher meal counters.
#[derive(Debug)]
pub struct Table {
    forks: Vec<Fork>,
    meals: Vec<AtomicU64>,
    config: DiningConfig,
    probe: Probe<DiningEvent>,
}

impl Table {
    fn new(config: DiningConfig, probe: Probe<DiningEvent>) -> Self {
        let n = config.philosophers;
        Self {
            forks: (0..n).map(Fork::new).collect(),
            meals: (0..n).map(|_| AtomicU64::new(0)).collect(),
            config,
            probe,
        }
    }

    pub fn seats(&self) -> usize {
        self.forks.len()
    }

    pub fn fork(&self, index: usize) -> &Fork {
        &self.forks[index]
    }

    pub fn config(&self) -> &DiningConfig {
        &self.config
    }

    pub fn probe(&self) -> &Probe<DiningEvent> {
        &self.probe
    }

    fn record_meal(&self, philosopher: usize) {
        self.meals[philosopher].fetch_add(1, Ordering::Relaxed);
    }

    fn meals(&self) -> Vec<u64> {
        self.meals.iter().map(|m| m.load(Ordering::Relaxed)).collect()
    }
}

/// What a dining run accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningReport {
    /// Completed meals, indexed by philosopher id.
    pub meals: Vec<u64>,
}

impl DiningReport {
    pub fn total_meals(&self) -> u64 {
        self.meals.iter().sum()
    }
}

/// Handle to a running table.
#[derive(Debug)]
pub struct DiningHandle {
    group: ActorGroup,
    table: Arc<Table>,
}

impl DiningHandle {
    /// Meals completed so far, indexed by philosopher id.
    pub fn meals(&self) -> Vec<u64> {
        self.table.meals()
    }
}

#[async_trait]
impl EngineHandle for DiningHandle {
    type Report = DiningReport;

    fn name(&self) -> &'static str {
        ENGINE
    }

    fn stop_signal(&self) -> RunState {
        self.group.state().clone()
    }

    async fn join(self) -> Result<DiningReport, CoordError> {
        self.group.join().await?;
        Ok(DiningReport {
            meals: self.table.meals(),
        })
    }
}

/// Seats the philosophers and starts one task per philosopher.
///
/// Must be called from within a Tokio runtime.
pub fn start(config: DiningConfig, probe: Probe<DiningEvent>) -> Result<DiningHandle, ConfigError> {
    config.validate()?;
    info!(
        engine = ENGINE,
        philosophers = config.philosophers,
        strategy = ?config.strategy,
        "Starting"
    );

    let seed = config.seed;
    let strategy = config.strategy;
    let table = Arc::new(Table::new(config, probe));
    let mut group = ActorGroup::new(ENGINE);
    for id in 0..table.seats() {
        group.spawn(Philosopher::new(id, strategy, seed), table.clone());
    }

    Ok(DiningHandle { group, table })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_philosopher_is_rejected() {
        let config = DiningConfig {
            philosophers: 1,
            ..DiningConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooFewActors {
                role: "philosophers",
                min: 2,
                got: 1
            })
        );
    }

    #[test]
    fn default_matches_classic_table() {
        let config = DiningConfig::default();
        assert_eq!(config.philosophers, 5);
        assert!(config.validate().is_ok());
    }
}
