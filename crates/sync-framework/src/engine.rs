//! # EngineHandle Trait
//!
//! The contract between a running engine and whoever owns its lifetime (the "run
//! coordinator"). A coordinator needs exactly two things from an engine: a way to
//! stop it cooperatively and a way to wait for it. Everything else, such as bounding
//! that wait, is provided here on top of those two.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use std::time::Duration;
//! use sync_framework::{ActorGroup, CoordError, EngineHandle, RunState};
//!
//! struct IdleHandle {
//!     group: ActorGroup,
//! }
//!
//! #[async_trait]
//! impl EngineHandle for IdleHandle {
//!     type Report = ();
//!
//!     fn name(&self) -> &'static str { "idle" }
//!     fn stop_signal(&self) -> RunState { self.group.state().clone() }
//!     async fn join(self) -> Result<(), CoordError> { self.group.join().await }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = IdleHandle { group: ActorGroup::new("idle") };
//!     handle.shutdown(Duration::from_millis(100)).await.unwrap();
//! }
//! ```

use crate::error::CoordError;
use crate::run_state::RunState;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// A started engine.
#[async_trait]
pub trait EngineHandle: Send + Sized + 'static {
    /// What the engine reports once every actor has returned.
    type Report: Send;

    fn name(&self) -> &'static str;

    /// The signal that [`stop`](Self::stop) triggers. Clone it to stop the engine
    /// from another task or thread while this handle is busy joining.
    fn stop_signal(&self) -> RunState;

    /// Waits for every actor to return and collects the report.
    ///
    /// Without a prior [`stop`](Self::stop) this waits for as long as the engine runs.
    async fn join(self) -> Result<Self::Report, CoordError>;

    /// Requests a cooperative stop. Idempotent.
    ///
    /// This never force-unblocks an actor parked on a wait that ignores
    /// cancellation; see [`shutdown`](Self::shutdown) for the bounded version.
    fn stop(&self) {
        info!(engine = self.name(), "Stop requested");
        self.stop_signal().stop();
    }

    /// Stops the engine and joins it, giving up after `grace`.
    ///
    /// On expiry the join is abandoned, which aborts every actor still running, and
    /// [`CoordError::ShutdownTimedOut`] is returned. That is how a deadlocked run
    /// surfaces: the engines themselves never detect one.
    async fn shutdown(self, grace: Duration) -> Result<Self::Report, CoordError> {
        let engine = self.name();
        self.stop();
        match tokio::time::timeout(grace, self.join()).await {
            Ok(result) => {
                if result.is_ok() {
                    info!(engine, "Shutdown complete");
                }
                result
            }
            Err(_) => {
                warn!(engine, ?grace, "Shutdown timed out; aborting remaining actors");
                Err(CoordError::ShutdownTimedOut { engine, grace })
            }
        }
    }
}
