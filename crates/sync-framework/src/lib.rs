//! # Sync Framework
//!
//! Building blocks for classical concurrent-resource-coordination engines: many
//! independent actors, each looping on its own Tokio task and blocking on shared
//! primitives, until a cooperative stop signal tells them to return.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Protocol Layer** ([`Actor`]) - one iteration of an actor's algorithm. This is
//!    the only thing an engine has to write.
//! 2. **Runtime Layer** ([`run_actor`], [`ActorGroup`]) - the loop, the stop checks,
//!    task ownership, and failure reporting.
//! 3. **Coordinator Layer** ([`EngineHandle`]) - stop, join, and bounded shutdown for
//!    whoever owns the engine's lifetime.
//!
//! ## Primitives
//!
//! | Primitive | Purpose |
//! |-----------|---------|
//! | [`RunState`] | Shared `running` flag + cancellation token, one per engine run |
//! | [`Semaphore`] | Counting semaphore with cancellable `wait` and `signal` |
//! | [`BlockingQueue`] | Bounded FIFO with blocking `add`/`take` and `complete_adding` |
//! | [`DelayRange`] | Randomized step durations |
//! | [`Probe`] | Optional, non-blocking trace of state transitions for tests |
//!
//! ## Cancellation Model
//!
//! Every wait a primitive offers takes a `&RunState` and returns [`Cancelled`] when
//! the run is stopped. Actor steps propagate it with `?`, and the run loop treats it
//! as a normal exit. Cancellation is *not* an error from a coordinator's point of
//! view: an engine that stops cleanly simply joins.
//!
//! What cancellation cannot reach is a wait that deliberately ignores it (an
//! exclusive lock in a deadlock-prone protocol, for instance). For those, the
//! coordinator bounds the join with [`EngineHandle::shutdown`], which aborts stuck
//! tasks and reports [`CoordError::ShutdownTimedOut`].
//!
//! ## Concurrency Model
//!
//! - Each actor runs in its own Tokio task; on the multi-threaded runtime any number
//!   of them run in parallel and the scheduler interleaves them arbitrarily.
//! - Suspension points (locks, semaphores, queue operations, step delays) suspend
//!   only the calling actor.
//! - No ordering among waiters on the same primitive is promised.

pub mod actor;
pub mod delay;
pub mod engine;
pub mod error;
pub mod probe;
pub mod queue;
pub mod run_state;
pub mod semaphore;
pub mod tracing;

// Re-export core types for convenience
pub use actor::{run_actor, Actor, ActorGroup, Flow};
pub use delay::{actor_rng, DelayRange};
pub use engine::EngineHandle;
pub use error::{Cancelled, ConfigError, CoordError, QueueError};
pub use probe::{Probe, Recorder};
pub use queue::BlockingQueue;
pub use run_state::RunState;
pub use semaphore::Semaphore;
