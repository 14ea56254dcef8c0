//! # Framework Errors
//!
//! This module defines the error types shared by every engine built on the framework.
//! They are split by the layer that produces them:
//!
//! - [`Cancelled`] - a blocking wait was interrupted by the shared stop signal.
//!   This is the *normal* shutdown path and never reaches a coordinator.
//! - [`QueueError`] - why [`BlockingQueue::add`](crate::BlockingQueue::add) refused an item.
//! - [`ConfigError`] - an engine was asked to start with an impossible configuration.
//! - [`CoordError`] - what a coordinator sees when joining or shutting down an engine.

use std::time::Duration;
use tokio::task::JoinError;

/// A wait was interrupted because the actor's [`RunState`](crate::RunState) was stopped.
///
/// Actor steps return `Result<_, Cancelled>` so that `?` unwinds a step at any
/// suspension point. The generic run loop treats it as a clean exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("wait cancelled by stop signal")]
pub struct Cancelled;

/// Errors returned when adding to a [`BlockingQueue`](crate::BlockingQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue is closed for additions")]
    Closed,
    #[error("wait cancelled by stop signal")]
    Cancelled,
}

impl From<Cancelled> for QueueError {
    fn from(_: Cancelled) -> Self {
        QueueError::Cancelled
    }
}

/// Rejected engine configurations. Checked before any task is spawned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{role}: at least {min} required, got {got}")]
    TooFewActors {
        role: &'static str,
        min: usize,
        got: usize,
    },
    #[error("{0} capacity must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("{name} delay range is inverted: {min_ms}ms > {max_ms}ms")]
    InvertedDelay {
        name: &'static str,
        min_ms: u64,
        max_ms: u64,
    },
}

/// Errors surfaced to whoever owns an engine's lifetime.
///
/// The engines have no internal deadlock detector. A deadlock shows up here only as
/// [`CoordError::ShutdownTimedOut`], raised by the coordinator's own deadline.
#[derive(Debug, thiserror::Error)]
pub enum CoordError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{engine} did not shut down within {grace:?}; remaining actors were aborted")]
    ShutdownTimedOut {
        engine: &'static str,
        grace: Duration,
    },
    #[error("{engine} actor task failed: {source}")]
    ActorFailed {
        engine: &'static str,
        #[source]
        source: JoinError,
    },
}
