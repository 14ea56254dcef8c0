//! # Observability Probe
//!
//! Engines report their state transitions (fork acquired, seat taken, item
//! enqueued, ...) through a [`Probe`]. In production the probe is disabled and every
//! `emit` is a single branch. Tests create a recording probe and inspect the trace
//! afterwards with a [`Recorder`].
//!
//! Emitting never blocks and never takes a lock shared with the engine: a recording
//! probe pushes into an unbounded [`mpsc`] channel. That keeps the hook from changing
//! the interleavings it is meant to observe.
//!
//! ## Usage
//!
//! ```rust
//! use sync_framework::Probe;
//!
//! let (probe, mut recorder) = Probe::<u32>::recording();
//! probe.emit(1);
//! probe.emit(2);
//! assert_eq!(recorder.drain(), vec![1, 2]);
//! ```

use tokio::sync::mpsc;

/// Sender half of the observability hook. Cheap to clone.
#[derive(Debug)]
pub struct Probe<E> {
    sink: Option<mpsc::UnboundedSender<E>>,
}

impl<E> Clone for Probe<E> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink.clone(),
        }
    }
}

impl<E> Probe<E> {
    /// A probe that drops every event.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// A probe that records every event for the returned [`Recorder`].
    pub fn recording() -> (Self, Recorder<E>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sink: Some(sender) }, Recorder { receiver })
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn emit(&self, event: E) {
        if let Some(sink) = &self.sink {
            // A dropped recorder just means nobody is listening any more.
            let _ = sink.send(event);
        }
    }
}

impl<E> Default for Probe<E> {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Receiver half of a recording probe.
#[derive(Debug)]
pub struct Recorder<E> {
    receiver: mpsc::UnboundedReceiver<E>,
}

impl<E> Recorder<E> {
    /// Returns every event emitted so far, in emission order.
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Waits for the next event. Returns `None` once every probe clone is dropped
    /// and the trace is exhausted.
    pub async fn next(&mut self) -> Option<E> {
        self.receiver.recv().await
    }
}
