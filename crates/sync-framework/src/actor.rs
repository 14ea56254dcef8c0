//! # Actors & Actor Groups
//!
//! This module defines the [`Actor`] trait, the generic loop that drives one actor
//! ([`run_actor`]), and the [`ActorGroup`] that owns a set of spawned actors.
//!
//! ## Architecture Note
//! Every engine in this workspace is "N independent loops blocking on shared
//! primitives". The loop plumbing (checking the stop flag, treating cancellation as
//! a clean exit, logging lifecycle events) is the same for a philosopher, a barber
//! and a producer, so it is written *once* here. An engine only implements
//! [`Actor::step`]: one iteration of its protocol.
//!
//! ## Shutdown
//! Stopping is cooperative. [`ActorGroup::stop`] flips the shared [`RunState`]; each
//! actor notices either at the top of its loop or inside a cancellable wait. A task
//! that is parked on something that does *not* observe cancellation keeps running
//! until the group is dropped, at which point the underlying [`JoinSet`] aborts it.

use crate::error::{Cancelled, CoordError};
use crate::run_state::RunState;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// What the run loop should do after a successful step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The actor has nothing left to do (e.g. a consumer found its buffer closed
    /// and drained). The loop exits even though the run state is still running.
    Finished,
}

/// One concurrent participant in an engine.
///
/// # Context
/// `Context` is the engine-owned shared state (forks, seat counter, buffer, ...).
/// It is created once per engine instance and handed to every actor behind an
/// [`Arc`], so there is no ambient global state. Actors that spawn helper tasks
/// clone the `Arc` to hand the state on.
#[async_trait]
pub trait Actor: Send + 'static {
    type Context: Send + Sync + 'static;

    /// The actor's index within its role, used for logging and ordering decisions.
    fn id(&self) -> usize;

    /// Runs one iteration of the actor's protocol.
    ///
    /// Any suspension point may return `Err(Cancelled)` via `?`; the loop then
    /// exits without completing the step.
    async fn step(&mut self, ctx: &Arc<Self::Context>, stop: &RunState) -> Result<Flow, Cancelled>;

    /// Called once after the loop exits, however it exited.
    async fn on_stop(&mut self, _ctx: &Arc<Self::Context>) {}
}

/// Drives `actor` until its run state stops, it is cancelled, or it finishes.
pub async fn run_actor<A: Actor>(mut actor: A, ctx: Arc<A::Context>, stop: RunState) {
    // Extract just the type name (e.g., "Philosopher" instead of "sync_problems::dining::Philosopher")
    let role = std::any::type_name::<A>()
        .split("::")
        .last()
        .unwrap_or("Unknown");
    let id = actor.id();
    info!(role, id, "Actor started");

    let mut steps: u64 = 0;
    let reason = loop {
        if !stop.is_running() {
            break "stopped";
        }
        match actor.step(&ctx, &stop).await {
            Ok(Flow::Continue) => steps += 1,
            Ok(Flow::Finished) => break "finished",
            Err(Cancelled) => {
                debug!(role, id, "Step cancelled");
                break "cancelled";
            }
        }
    };

    actor.on_stop(&ctx).await;
    info!(role, id, steps, reason, "Actor stopped");
}

/// A set of actors sharing one [`RunState`].
///
/// Dropping a group without joining it aborts every task still running. That is
/// the hard cancellation used when a cooperative shutdown does not finish in time.
#[derive(Debug)]
pub struct ActorGroup {
    engine: &'static str,
    state: RunState,
    tasks: JoinSet<()>,
}

impl ActorGroup {
    pub fn new(engine: &'static str) -> Self {
        Self {
            engine,
            state: RunState::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Spawns `actor` onto the current Tokio runtime.
    pub fn spawn<A: Actor>(&mut self, actor: A, ctx: Arc<A::Context>) {
        self.tasks.spawn(run_actor(actor, ctx, self.state.clone()));
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn stop(&self) {
        self.state.stop();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every actor to return.
    ///
    /// A panicking actor (for example a failed invariant assertion) is reported as
    /// [`CoordError::ActorFailed`]; the remaining actors are aborted.
    pub async fn join(mut self) -> Result<(), CoordError> {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(engine = self.engine, error = %e, "Actor task failed");
                return Err(CoordError::ActorFailed {
                    engine: self.engine,
                    source: e,
                });
            }
        }
        debug!(engine = self.engine, "All actors joined");
        Ok(())
    }
}
