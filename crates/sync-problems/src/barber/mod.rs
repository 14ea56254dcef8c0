//! # Sleeping Barber
//!
//! One barber, one barber chair, and a waiting room with a fixed number of chairs.
//! Customers arrive at random intervals. A customer who finds a free waiting chair
//! sits down and waits to be called; a customer who finds the room full leaves at
//! once (*balks*).
//!
//! ## Protocol
//!
//! Shared state lives in [`BarberShop`]: a mutex-guarded `free_seats` counter
//! (starts at the number of waiting chairs) and two counting semaphores,
//! `customer_ready` and `barber_ready`.
//!
//! - **Barber** ([`Barber`]): wait `customer_ready` → under the mutex, `free_seats += 1`
//!   (the customer leaves the waiting room) → signal `barber_ready` → cut hair.
//! - **Customer** ([`customer_arrives`]): under the mutex, if `free_seats > 0` take a
//!   seat (`free_seats -= 1`), signal `customer_ready`, then wait `barber_ready`;
//!   otherwise balk without waiting on anything.
//!
//! `barber_ready` is signalled as soon as the barber has claimed a customer, *not*
//! after the haircut. A customer's wait therefore ends when it is accepted into
//! the chair, which is what [`Admission::Granted`] means.
//!
//! ## Invariants
//!
//! - `0 <= free_seats <= waiting_chairs` at every instant; checked under the mutex.
//! - At most `waiting_chairs` customers are blocked on `barber_ready` at once, since
//!   only seated customers ever wait on it.

pub mod barber_actor;
pub mod customers;

pub use barber_actor::Barber;
pub use customers::{customer_arrives, CustomerGenerator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use sync_framework::{ActorGroup, ConfigError, CoordError, DelayRange, EngineHandle, Probe, RunState, Semaphore};
use tokio::task::JoinHandle;
use tracing::info;

pub const ENGINE: &str = "sleeping-barber";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarberConfig {
    pub waiting_chairs: usize,
    pub haircut: DelayRange,
    /// Interval between generated arrivals. `None` disables the generator; customers
    /// then only arrive through [`BarberHandle::spawn_customer`].
    pub arrivals: Option<DelayRange>,
    pub seed: Option<u64>,
}

impl Default for BarberConfig {
    fn default() -> Self {
        Self {
            waiting_chairs: 3,
            haircut: DelayRange::new(1000, 3000),
            arrivals: Some(DelayRange::new(500, 2000)),
            seed: None,
        }
    }
}

impl BarberConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waiting_chairs == 0 {
            return Err(ConfigError::ZeroCapacity("waiting room"));
        }
        self.haircut.validate("haircut")?;
        if let Some(arrivals) = &self.arrivals {
            arrivals.validate("arrivals")?;
        }
        Ok(())
    }
}

/// State transitions reported through the engine's [`Probe`].
///
/// `free_seats` is the value read inside the seat mutex at the time of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarberEvent {
    SeatTaken { customer: u64, free_seats: usize },
    Balked { customer: u64 },
    SeatFreed { free_seats: usize },
    ServiceStarted,
    ServiceFinished,
}

/// How a customer's visit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The barber called the customer into the chair.
    Granted,
    /// The waiting room was full; the customer left without waiting.
    Balked,
    /// The shop closed while the customer was waiting.
    Cancelled,
}

/// Shared state of one shop run.
#[derive(Debug)]
pub struct BarberShop {
    waiting_chairs: usize,
    free_seats: Mutex<usize>,
    customer_ready: Semaphore,
    barber_ready: Semaphore,
    seated: AtomicU64,
    balked: AtomicU64,
    haircuts: AtomicU64,
    config: BarberConfig,
    probe: Probe<BarberEvent>,
}

impl BarberShop {
    pub fn new(config: BarberConfig, probe: Probe<BarberEvent>) -> Self {
        Self {
            waiting_chairs: config.waiting_chairs,
            free_seats: Mutex::new(config.waiting_chairs),
            customer_ready: Semaphore::new(0),
            barber_ready: Semaphore::new(0),
            seated: AtomicU64::new(0),
            balked: AtomicU64::new(0),
            haircuts: AtomicU64::new(0),
            config,
            probe,
        }
    }

    pub fn waiting_chairs(&self) -> usize {
        self.waiting_chairs
    }

    /// Current number of free waiting chairs.
    pub fn free_seats(&self) -> usize {
        *self.seats()
    }

    fn seats(&self) -> MutexGuard<'_, usize> {
        self.free_seats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self) -> BarberReport {
        BarberReport {
            seated: self.seated.load(Ordering::Relaxed),
            balked: self.balked.load(Ordering::Relaxed),
            haircuts: self.haircuts.load(Ordering::Relaxed),
        }
    }
}

/// What a shop run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarberReport {
    /// Customers who found a free waiting chair.
    pub seated: u64,
    /// Customers who found the waiting room full.
    pub balked: u64,
    /// Haircuts completed before the shop closed.
    pub haircuts: u64,
}

/// Handle to a running shop.
#[derive(Debug)]
pub struct BarberHandle {
    group: ActorGroup,
    shop: Arc<BarberShop>,
}

impl BarberHandle {
    pub fn shop(&self) -> &Arc<BarberShop> {
        &self.shop
    }

    /// Sends one customer into the shop on its own task.
    ///
    /// The task resolves with [`Admission::Balked`] immediately if the waiting room is
    /// full, or once the barber calls the customer (or the shop closes) otherwise.
    pub fn spawn_customer(&self, customer: u64) -> JoinHandle<Admission> {
        tokio::spawn(customer_arrives(self.shop.clone(), customer, self.group.state().clone()))
    }
}

#[async_trait]
impl EngineHandle for BarberHandle {
    type Report = BarberReport;

    fn name(&self) -> &'static str {
        ENGINE
    }

    fn stop_signal(&self) -> RunState {
        self.group.state().clone()
    }

    async fn join(self) -> Result<BarberReport, CoordError> {
        self.group.join().await?;
        Ok(self.shop.report())
    }
}

/// Opens the shop: starts the barber and, if configured, the customer generator.
///
/// Must be called from within a Tokio runtime.
pub fn start(config: BarberConfig, probe: Probe<BarberEvent>) -> Result<BarberHandle, ConfigError> {
    config.validate()?;
    info!(
        engine = ENGINE,
        waiting_chairs = config.waiting_chairs,
        generator = config.arrivals.is_some(),
        "Starting"
    );

    let seed = config.seed;
    let arrivals = config.arrivals;
    let shop = Arc::new(BarberShop::new(config, probe));
    let mut group = ActorGroup::new(ENGINE);
    group.spawn(Barber::new(seed), shop.clone());
    if let Some(arrivals) = arrivals {
        group.spawn(CustomerGenerator::new(arrivals, seed), shop.clone());
    }

    Ok(BarberHandle { group, shop })
}
