//! # Run Coordination
//!
//! The engines never stop on their own. Whoever starts one owns its lifetime: let it
//! run for a while, request a stop, and wait a bounded time for it to wind down.
//! [`run_for`] is that sequence for any [`EngineHandle`]; [`Lab`] chains the five
//! demonstration runs.
//!
//! ## Deadlock Surfacing
//!
//! Nothing inside an engine detects a deadlock. A run whose actors are parked on
//! waits that ignore the stop signal simply fails to join, and the coordinator's
//! grace period turns that into [`CoordError::ShutdownTimedOut`]. For the unordered
//! dining run that outcome is expected and [`Lab::run_all`] carries on.

use crate::barber::{self, BarberConfig};
use crate::dining::{self, DiningConfig, Strategy};
use crate::producer_consumer::{self, BufferConfig, BufferKind};
use std::fmt::Debug;
use std::time::Duration;
use sync_framework::{CoordError, EngineHandle, Probe};
use tracing::{info, warn};

/// Lets `handle` run for `duration`, then shuts it down within `grace`.
pub async fn run_for<H>(handle: H, duration: Duration, grace: Duration) -> Result<H::Report, CoordError>
where
    H: EngineHandle,
{
    info!(engine = handle.name(), ?duration, "Running");
    tokio::time::sleep(duration).await;
    handle.shutdown(grace).await
}

/// The demonstration sequence: dining without and with fork ordering, the barber
/// shop, and the buffer over both implementations.
#[derive(Debug, Clone)]
pub struct Lab {
    /// How long the dining and buffer engines run before they are stopped.
    pub run_time: Duration,
    /// How long the barber shop stays open. Longer than `run_time` by default, since
    /// haircuts take up to three seconds each.
    pub barber_run_time: Duration,
    /// Idle time between runs, so log output from consecutive runs does not interleave.
    pub pause: Duration,
    pub grace: Duration,
}

impl Default for Lab {
    fn default() -> Self {
        Self {
            run_time: Duration::from_secs(10),
            barber_run_time: Duration::from_secs(15),
            pause: Duration::from_secs(2),
            // Long enough for consumers to drain a full buffer at default speeds.
            grace: Duration::from_secs(10),
        }
    }
}

impl Lab {
    pub async fn run_all(&self) -> Result<(), CoordError> {
        // =====================================================================
        // 1. Dining philosophers, every philosopher reaches left first
        // =====================================================================
        let unordered = dining::start(
            DiningConfig {
                strategy: Strategy::Unordered,
                ..DiningConfig::default()
            },
            Probe::disabled(),
        )?;
        match run_for(unordered, self.run_time, self.grace).await {
            Ok(report) => log_report("dining (unordered)", &report),
            Err(CoordError::ShutdownTimedOut { .. }) => {
                warn!("Unordered table deadlocked: every philosopher holds one fork")
            }
            Err(e) => return Err(e),
        }
        self.pause().await;

        // =====================================================================
        // 2. Dining philosophers, parity-ordered acquisition
        // =====================================================================
        let ordered = dining::start(DiningConfig::default(), Probe::disabled())?;
        let report = run_for(ordered, self.run_time, self.grace).await?;
        log_report("dining (parity ordered)", &report);
        self.pause().await;

        // =====================================================================
        // 3. Sleeping barber
        // =====================================================================
        let shop = barber::start(BarberConfig::default(), Probe::disabled())?;
        let report = run_for(shop, self.barber_run_time, self.grace).await?;
        log_report("sleeping barber", &report);
        self.pause().await;

        // =====================================================================
        // 4. Producer/consumer over both buffers
        // =====================================================================
        for kind in [BufferKind::BlockingQueue, BufferKind::SemaphorePair] {
            let pipeline = producer_consumer::start(
                BufferConfig {
                    kind,
                    ..BufferConfig::default()
                },
                Probe::disabled(),
            )?;
            let report = run_for(pipeline, self.run_time, self.grace).await?;
            log_report(&format!("producer/consumer ({kind:?})"), &report);
            self.pause().await;
        }

        info!("All runs complete");
        Ok(())
    }

    async fn pause(&self) {
        tokio::time::sleep(self.pause).await;
    }
}

fn log_report<R: Debug>(run: &str, report: &R) {
    info!(run, ?report, "Run finished");
}
