//! # Observability & Tracing
//!
//! Structured logging for every engine, built on the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle** (`info`): start and stop of every actor, with its role, id,
//!   completed step count and exit reason (`stopped`, `cancelled`, `finished`).
//! - **Engine Lifecycle** (`info`): engine start, stop requests, shutdown completion.
//! - **Protocol Steps** (`debug`): fork acquired/released, seat taken/freed, item
//!   enqueued/dequeued, with the values read inside the critical section.
//! - **Anomalies** (`warn`/`error`): balking customers, shutdown timeouts (the visible
//!   symptom of a deadlock), failed actor tasks.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle only
//! RUST_LOG=info cargo run -p sync-problems
//!
//! # Every protocol step
//! RUST_LOG=debug cargo run -p sync-problems
//!
//! # Only the barber engine
//! RUST_LOG=info,sync_problems::barber=debug cargo run -p sync-problems
//! ```
//!
//! Typical `debug` output for a philosopher:
//!
//! ```text
//! DEBUG Thinking id=2 ms=812
//! DEBUG Fork acquired id=2 fork=2 position="first"
//! DEBUG Fork acquired id=2 fork=3 position="second"
//! DEBUG Eating id=2 ms=431
//! INFO Actor stopped role="Philosopher" id=2 steps=3 reason="cancelled"
//! ```

/// Installs the global `fmt` subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Role and id fields identify the actor; module paths are noise
        .compact()
        .init();
}
