//! # Producer / Consumer
//!
//! Producers and consumers share one bounded FIFO buffer. A producer suspends while
//! the buffer is full and a consumer while it is empty; nothing is ever dropped or
//! duplicated.
//!
//! Two interchangeable buffers implement [`BoundedBuffer`]:
//!
//! | [`BufferKind`] | Construction |
//! |---|---|
//! | `BlockingQueue` | [`sync_framework::BlockingQueue`]: one lock, two wake-up lists |
//! | `SemaphorePair` | mutex-guarded deque + `empty_slots`/`full_slots` semaphores |
//!
//! ## Shutdown
//!
//! Stopping affects producers only. [`BufferHandle::join`] then runs the drain
//! sequence: join producers → close the buffer → consumers empty it and finish →
//! join consumers. A clean shutdown therefore always reports `remaining == 0` and
//! `consumed == produced`.

pub mod buffer;
pub mod consumer;
pub mod producer;

pub use buffer::{BoundedBuffer, QueueBuffer, SemaphoreBuffer};
pub use consumer::Consumer;
pub use producer::Producer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use sync_framework::{ActorGroup, ConfigError, CoordError, DelayRange, EngineHandle, Probe, RunState};
use tracing::info;

pub const ENGINE: &str = "producer-consumer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    BlockingQueue,
    SemaphorePair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub kind: BufferKind,
    pub capacity: usize,
    pub producers: usize,
    pub consumers: usize,
    pub produce: DelayRange,
    pub consume: DelayRange,
    pub seed: Option<u64>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            kind: BufferKind::BlockingQueue,
            capacity: 5,
            producers: 2,
            consumers: 2,
            produce: DelayRange::new(500, 1500),
            consume: DelayRange::new(500, 1500),
            seed: None,
        }
    }
}

impl BufferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity("buffer"));
        }
        for (role, got) in [("producers", self.producers), ("consumers", self.consumers)] {
            if got == 0 {
                return Err(ConfigError::TooFewActors { role, min: 1, got });
            }
        }
        self.produce.validate("produce")?;
        self.consume.validate("consume")
    }
}

/// Buffer transitions, emitted inside the buffer's critical section.
///
/// `len` is the buffer length right after the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEvent {
    Enqueued { producer: usize, item: u64, len: usize },
    Dequeued { consumer: usize, item: u64, len: usize },
}

/// Shared state of one run.
#[derive(Debug)]
pub struct Pipeline {
    buffer: Box<dyn BoundedBuffer>,
    config: BufferConfig,
    produced: AtomicU64,
    consumed: AtomicU64,
}

impl Pipeline {
    fn new(config: BufferConfig, probe: Probe<BufferEvent>) -> Self {
        let buffer: Box<dyn BoundedBuffer> = match config.kind {
            BufferKind::BlockingQueue => Box::new(QueueBuffer::new(config.capacity, probe)),
            BufferKind::SemaphorePair => Box::new(SemaphoreBuffer::new(config.capacity, probe)),
        };
        Self {
            buffer,
            config,
            produced: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
        }
    }

    pub fn buffer(&self) -> &dyn BoundedBuffer {
        self.buffer.as_ref()
    }

    fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    fn record_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    fn report(&self) -> BufferReport {
        BufferReport {
            produced: self.produced.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            remaining: self.buffer.len(),
        }
    }
}

/// What a buffer run accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferReport {
    pub produced: u64,
    pub consumed: u64,
    /// Items left in the buffer when the report was taken.
    pub remaining: usize,
}

/// Handle to a running pipeline.
#[derive(Debug)]
pub struct BufferHandle {
    producers: ActorGroup,
    consumers: ActorGroup,
    pipeline: Arc<Pipeline>,
}

impl BufferHandle {
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

#[async_trait]
impl EngineHandle for BufferHandle {
    type Report = BufferReport;

    fn name(&self) -> &'static str {
        ENGINE
    }

    /// The producers' signal. Consumers are never stopped; they finish by draining.
    fn stop_signal(&self) -> RunState {
        self.producers.state().clone()
    }

    async fn join(self) -> Result<BufferReport, CoordError> {
        let Self {
            producers,
            consumers,
            pipeline,
        } = self;

        producers.join().await?;
        pipeline.buffer.close();
        info!(engine = ENGINE, remaining = pipeline.buffer.len(), "Buffer closed, draining");
        consumers.join().await?;

        Ok(pipeline.report())
    }
}

/// Creates the buffer and starts every producer and consumer.
///
/// Must be called from within a Tokio runtime.
pub fn start(config: BufferConfig, probe: Probe<BufferEvent>) -> Result<BufferHandle, ConfigError> {
    config.validate()?;
    info!(
        engine = ENGINE,
        kind = ?config.kind,
        capacity = config.capacity,
        producers = config.producers,
        consumers = config.consumers,
        "Starting"
    );

    let seed = config.seed;
    let (n_producers, n_consumers) = (config.producers, config.consumers);
    let pipeline = Arc::new(Pipeline::new(config, probe));

    let mut producers = ActorGroup::new(ENGINE);
    for id in 0..n_producers {
        producers.spawn(Producer::new(id, seed), pipeline.clone());
    }
    let mut consumers = ActorGroup::new(ENGINE);
    for id in 0..n_consumers {
        consumers.spawn(Consumer::new(id, seed), pipeline.clone());
    }

    Ok(BufferHandle {
        producers,
        consumers,
        pipeline,
    })
}
