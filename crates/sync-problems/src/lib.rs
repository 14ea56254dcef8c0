//! # Synchronization Problems
//!
//! Three classic concurrency problems built on `sync-framework`, each as an engine
//! that is started, left running, and stopped by a coordinator:
//!
//! - **[dining]**: resource ordering. Philosophers need two shared forks; an
//!   unordered variant deadlocks, a parity-ordered one cannot.
//! - **[barber]**: admission control. One barber, a fixed waiting room, customers
//!   who leave when it is full.
//! - **[producer_consumer]**: a bounded buffer, as a blocking queue or as a
//!   semaphore pair.
//! - **[lifecycle]**: timed runs and the demonstration sequence.
//!
//! Every engine accepts a [`Probe`](sync_framework::Probe) that records its state
//! transitions, which is how the tests check invariants from the outside.

pub mod barber;
pub mod dining;
pub mod lifecycle;
pub mod producer_consumer;
