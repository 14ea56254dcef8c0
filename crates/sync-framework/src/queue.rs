//! # Managed Blocking Queue
//!
//! A bounded FIFO with the semantics of a blocking collection: `add` suspends while
//! the queue is full, `take` suspends while it is empty, and
//! [`complete_adding`](BlockingQueue::complete_adding) closes the queue so that
//! consumers drain what is left and then see `None` instead of blocking forever.
//!
//! Internally this is a monitor: one mutex over the items and the closed flag, and
//! two [`Notify`] conditions (`not_full`, `not_empty`). Each waiter arms its
//! notification *before* re-checking the state under the lock, so a notification
//! that lands between the check and the await is never lost.

use crate::error::{Cancelled, QueueError};
use crate::run_state::RunState;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug)]
struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded blocking FIFO shared by producers and consumers.
#[derive(Debug)]
pub struct BlockingQueue<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_full: Notify,
    not_empty: Notify,
}

impl<T: Send> BlockingQueue<T> {
    /// Creates an open, empty queue. `capacity` must be at least 1.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "blocking queue capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Notify::new(),
            not_empty: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `item`, suspending while the queue is full.
    ///
    /// Returns the queue length observed right after the insert.
    pub async fn add(&self, item: T, stop: &RunState) -> Result<usize, QueueError> {
        self.add_with(item, stop, |_| {}).await
    }

    /// Like [`add`](Self::add), but runs `inspect` with the new length while the
    /// queue lock is still held. Instrumentation uses this to record lengths that
    /// are exact at the instant of the insert.
    pub async fn add_with<F>(&self, item: T, stop: &RunState, inspect: F) -> Result<usize, QueueError>
    where
        F: FnOnce(usize),
    {
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return Err(QueueError::Closed);
                }
                if state.items.len() < self.capacity {
                    state.items.push_back(item);
                    let len = state.items.len();
                    assert!(len <= self.capacity, "queue overflow: {len} > {}", self.capacity);
                    inspect(len);
                    drop(state);
                    self.not_empty.notify_one();
                    return Ok(len);
                }
            }

            tokio::select! {
                biased;
                _ = stop.cancelled() => return Err(QueueError::Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Removes the oldest item, suspending while the queue is empty.
    ///
    /// Returns `Ok(None)` once the queue is closed and drained.
    pub async fn take(&self, stop: &RunState) -> Result<Option<(T, usize)>, Cancelled> {
        self.take_with(stop, |_, _| {}).await
    }

    /// Like [`take`](Self::take), running `inspect` with the removed item and the
    /// remaining length under the queue lock.
    pub async fn take_with<F>(&self, stop: &RunState, inspect: F) -> Result<Option<(T, usize)>, Cancelled>
    where
        F: FnOnce(&T, usize),
    {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    let len = state.items.len();
                    inspect(&item, len);
                    drop(state);
                    self.not_full.notify_one();
                    return Ok(Some((item, len)));
                }
                if state.closed {
                    return Ok(None);
                }
            }

            tokio::select! {
                biased;
                _ = stop.cancelled() => return Err(Cancelled),
                _ = &mut notified => {}
            }
        }
    }

    /// Marks the queue closed for additions and wakes every parked waiter.
    pub fn complete_adding(&self) {
        self.lock().closed = true;
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    pub fn is_completed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn preserves_insertion_order() {
        let queue = BlockingQueue::new(3);
        let stop = RunState::new();

        for i in 1..=3 {
            assert_eq!(queue.add(i, &stop).await, Ok(i));
        }
        assert_eq!(queue.take(&stop).await, Ok(Some((1, 2))));
        assert_eq!(queue.take(&stop).await, Ok(Some((2, 1))));
        assert_eq!(queue.take(&stop).await, Ok(Some((3, 0))));
    }

    #[tokio::test]
    async fn add_blocks_while_full() {
        let queue = Arc::new(BlockingQueue::new(1));
        let stop = RunState::new();
        queue.add(1, &stop).await.unwrap();

        let producer = {
            let queue = queue.clone();
            let stop = stop.clone();
            tokio::spawn(async move { queue.add(2, &stop).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.take(&stop).await, Ok(Some((1, 0))));
        assert_eq!(producer.await.unwrap(), Ok(1));
    }

    #[tokio::test]
    async fn complete_adding_releases_consumers_after_drain() {
        let queue = Arc::new(BlockingQueue::new(2));
        let stop = RunState::new();
        queue.add(7, &stop).await.unwrap();
        queue.complete_adding();

        assert!(queue.is_completed());
        assert_eq!(queue.add(8, &stop).await, Err(QueueError::Closed));
        assert_eq!(queue.take(&stop).await, Ok(Some((7, 0))));
        assert_eq!(queue.take(&stop).await, Ok(None));
    }

    #[tokio::test]
    async fn complete_adding_wakes_parked_consumer() {
        let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new(2));
        let stop = RunState::new();

        let consumer = {
            let queue = queue.clone();
            let stop = stop.clone();
            tokio::spawn(async move { queue.take(&stop).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.complete_adding();

        let result = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("consumer should wake on close")
            .unwrap();
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn stop_unblocks_parked_producer() {
        let queue = Arc::new(BlockingQueue::new(1));
        let stop = RunState::new();
        queue.add(1, &stop).await.unwrap();

        let producer = {
            let queue = queue.clone();
            let stop = stop.clone();
            tokio::spawn(async move { queue.add(2, &stop).await })
        };

        stop.stop();
        let result = tokio::time::timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should return promptly")
            .unwrap();
        assert_eq!(result, Err(QueueError::Cancelled));
        assert_eq!(queue.len(), 1);
    }
}
