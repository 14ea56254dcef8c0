//! The two bounded-buffer implementations behind [`BoundedBuffer`].

use super::BufferEvent;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};
use sync_framework::{BlockingQueue, Cancelled, Probe, RunState, Semaphore};

/// A fixed-capacity FIFO of items shared by producers and consumers.
///
/// Both operations report the buffer length observed inside the critical section,
/// and emit the matching [`BufferEvent`] there too, so a recorded event stream is a
/// linearization of the buffer's history.
#[async_trait]
pub trait BoundedBuffer: Send + Sync + Debug {
    /// Appends `item`, suspending while the buffer is full. Returns the new length.
    ///
    /// Fails with `Cancelled` if `stop` fires or the buffer has been closed.
    async fn put(&self, producer: usize, item: u64, stop: &RunState) -> Result<usize, Cancelled>;

    /// Removes the oldest item, suspending while the buffer is empty.
    ///
    /// Returns `Ok(None)` once the buffer is closed and empty.
    async fn take(&self, consumer: usize, stop: &RunState) -> Result<Option<(u64, usize)>, Cancelled>;

    /// Refuses further `put`s and lets consumers drain what is left.
    fn close(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}

/// [`BlockingQueue`] with event reporting.
#[derive(Debug)]
pub struct QueueBuffer {
    queue: BlockingQueue<u64>,
    probe: Probe<BufferEvent>,
}

impl QueueBuffer {
    pub fn new(capacity: usize, probe: Probe<BufferEvent>) -> Self {
        Self {
            queue: BlockingQueue::new(capacity),
            probe,
        }
    }
}

#[async_trait]
impl BoundedBuffer for QueueBuffer {
    async fn put(&self, producer: usize, item: u64, stop: &RunState) -> Result<usize, Cancelled> {
        let probe = &self.probe;
        self.queue
            .add_with(item, stop, |len| probe.emit(BufferEvent::Enqueued { producer, item, len }))
            .await
            .map_err(|_| Cancelled)
    }

    async fn take(&self, consumer: usize, stop: &RunState) -> Result<Option<(u64, usize)>, Cancelled> {
        let probe = &self.probe;
        self.queue
            .take_with(stop, |&item, len| probe.emit(BufferEvent::Dequeued { consumer, item, len }))
            .await
    }

    fn close(&self) {
        self.queue.complete_adding();
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// The textbook construction: a mutex-guarded deque plus `empty_slots` (starts at
/// capacity) and `full_slots` (starts at zero) counting semaphores.
#[derive(Debug)]
pub struct SemaphoreBuffer {
    capacity: usize,
    items: Mutex<VecDeque<u64>>,
    empty_slots: Semaphore,
    full_slots: Semaphore,
    open: RunState,
    probe: Probe<BufferEvent>,
}

impl SemaphoreBuffer {
    pub fn new(capacity: usize, probe: Probe<BufferEvent>) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            empty_slots: Semaphore::new(capacity),
            full_slots: Semaphore::new(0),
            open: RunState::new(),
            probe,
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<u64>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl BoundedBuffer for SemaphoreBuffer {
    async fn put(&self, producer: usize, item: u64, stop: &RunState) -> Result<usize, Cancelled> {
        tokio::select! {
            biased;
            _ = self.open.cancelled() => return Err(Cancelled),
            acquired = self.empty_slots.wait(stop) => acquired?,
        }

        let mut items = self.items();
        if !self.open.is_running() {
            // Closed while the slot was being granted.
            drop(items);
            self.empty_slots.signal();
            return Err(Cancelled);
        }
        items.push_back(item);
        let len = items.len();
        assert!(len <= self.capacity, "buffer length {len} exceeds capacity {}", self.capacity);
        self.probe.emit(BufferEvent::Enqueued { producer, item, len });
        // Signalled under the lock so a consumer that sees the close also sees this item.
        self.full_slots.signal();
        Ok(len)
    }

    async fn take(&self, consumer: usize, stop: &RunState) -> Result<Option<(u64, usize)>, Cancelled> {
        tokio::select! {
            biased;
            acquired = self.full_slots.wait(stop) => acquired?,
            _ = self.open.cancelled() => {
                // Closed: every remaining item still has its full-slot permit.
                if !self.full_slots.try_wait() {
                    return Ok(None);
                }
            }
        }

        let (item, len) = {
            let mut items = self.items();
            let Some(item) = items.pop_front() else {
                unreachable!("full-slot permit acquired on an empty buffer");
            };
            let len = items.len();
            self.probe.emit(BufferEvent::Dequeued { consumer, item, len });
            (item, len)
        };

        self.empty_slots.signal();
        Ok(Some((item, len)))
    }

    fn close(&self) {
        let _items = self.items();
        self.open.stop();
    }

    fn len(&self) -> usize {
        self.items().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn both(capacity: usize) -> Vec<Box<dyn BoundedBuffer>> {
        vec![
            Box::new(QueueBuffer::new(capacity, Probe::disabled())),
            Box::new(SemaphoreBuffer::new(capacity, Probe::disabled())),
        ]
    }

    #[tokio::test]
    async fn fifo_within_capacity() {
        let stop = RunState::new();
        for buffer in both(3) {
            assert_eq!(buffer.put(0, 10, &stop).await, Ok(1));
            assert_eq!(buffer.put(0, 11, &stop).await, Ok(2));
            assert_eq!(buffer.take(0, &stop).await, Ok(Some((10, 1))));
            assert_eq!(buffer.take(0, &stop).await, Ok(Some((11, 0))));
        }
    }

    #[tokio::test]
    async fn full_buffer_blocks_until_cancelled() {
        for buffer in both(1) {
            let stop = RunState::new();
            buffer.put(0, 1, &stop).await.unwrap();

            let blocked = tokio::time::timeout(Duration::from_millis(20), buffer.put(0, 2, &stop)).await;
            assert!(blocked.is_err(), "put on a full buffer must wait");

            stop.stop();
            assert_eq!(buffer.put(0, 2, &stop).await, Err(Cancelled));
            assert_eq!(buffer.len(), 1);
        }
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let stop = RunState::new();
        for buffer in both(4) {
            buffer.put(0, 1, &stop).await.unwrap();
            buffer.put(1, 2, &stop).await.unwrap();
            buffer.close();

            assert_eq!(buffer.put(0, 3, &stop).await, Err(Cancelled));
            assert_eq!(buffer.take(0, &stop).await, Ok(Some((1, 1))));
            assert_eq!(buffer.take(0, &stop).await, Ok(Some((2, 0))));
            assert_eq!(buffer.take(0, &stop).await, Ok(None));
            assert!(buffer.is_empty());
        }
    }

    #[tokio::test]
    async fn close_refuses_parked_producer() {
        for buffer in both(1) {
            let buffer: std::sync::Arc<dyn BoundedBuffer> = buffer.into();
            let stop = RunState::new();
            buffer.put(0, 1, &stop).await.unwrap();

            let producer = {
                let buffer = buffer.clone();
                let stop = stop.clone();
                tokio::spawn(async move { buffer.put(0, 2, &stop).await })
            };
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(!producer.is_finished(), "put on a full buffer must wait");

            buffer.close();
            assert_eq!(buffer.take(0, &stop).await, Ok(Some((1, 0))));
            assert_eq!(producer.await.unwrap(), Err(Cancelled));
            assert_eq!(buffer.take(0, &stop).await, Ok(None));
            assert!(buffer.is_empty());
        }
    }

    #[tokio::test]
    async fn close_wakes_parked_consumer() {
        for buffer in both(2) {
            let buffer: std::sync::Arc<dyn BoundedBuffer> = buffer.into();
            let stop = RunState::new();
            let consumer = {
                let buffer = buffer.clone();
                let stop = stop.clone();
                tokio::spawn(async move { buffer.take(0, &stop).await })
            };
            tokio::time::sleep(Duration::from_millis(10)).await;
            buffer.close();
            assert_eq!(consumer.await.unwrap(), Ok(None));
        }
    }
}
