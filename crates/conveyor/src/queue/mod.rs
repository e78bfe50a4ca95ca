//! Bounded FIFO buffer connecting producers to workers.
//!
//! This module defines [`WorkQueue`], the single shared resource of the
//! pipeline. It is safe for any number of concurrent producers and consumers
//! without external locking, and its lifecycle is a one-way state machine:
//!
//! ```text
//! Open ──▶ Draining ──▶ Closed
//! ```
//!
//! Separating `Draining` from `Closed` is what lets already-buffered items be
//! fully processed after new submissions are refused: producers are rejected
//! the moment draining begins, while consumers keep popping until the buffer
//! is empty and only then observe the closed queue.


use crate::item::WorkItem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Lifecycle of a [`WorkQueue`]. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Accepting pushes; pops suspend while empty.
    Open,
    /// No new pushes; already-buffered items remain poppable.
    Draining,
    /// Empty and will never yield another item.
    Closed,
}

struct Inner<T> {
    buf: VecDeque<WorkItem<T>>,
    state: QueueState,
}

/// A bounded FIFO queue with backpressure and drain-aware close semantics.
///
/// `push` suspends the caller while the queue is at capacity (an overloaded
/// pipeline slows producers rather than growing memory unboundedly); `pop`
/// suspends a consumer while the queue is empty. Both resume deterministically
/// once the complementary operation occurs or draining begins.
pub struct WorkQueue<T> {
    inner: Mutex<Inner<T>>,
    /// Signalled when an item is buffered or the queue closes.
    item_ready: Notify,
    /// Signalled when a slot frees up or draining begins.
    slot_free: Notify,
    capacity: usize,
}

impl<T> WorkQueue<T> {
    /// Creates a queue with a fixed positive capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be greater than 0");
        Self {
            inner: Mutex::new(Inner {
                buf: VecDeque::with_capacity(capacity),
                state: QueueState::Open,
            }),
            item_ready: Notify::new(),
            slot_free: Notify::new(),
            capacity,
        }
    }

    /// Buffers an item, suspending while the queue is at capacity.
    ///
    /// Returns once the item is buffered (an acknowledgement of acceptance,
    /// not of completion).
    ///
    /// # Errors
    ///
    /// Fails with [`Error::QueueClosed`](crate::Error::QueueClosed) if the
    /// queue is `Draining` or `Closed` at the time of the call - including a
    /// caller that was already suspended at capacity when draining began. No
    /// new item is accepted once draining has begun.
    pub async fn push(&self, item: WorkItem<T>) -> crate::Result<()> {
        loop {
            // Register for the wakeup before checking the predicate, so a
            // notify_waiters between unlock and await cannot be lost.
            let slot_free = self.slot_free.notified();
            {
                let mut inner = self.inner.lock();
                match inner.state {
                    QueueState::Open => {
                        if inner.buf.len() < self.capacity {
                            inner.buf.push_back(item);
                            drop(inner);
                            self.item_ready.notify_one();
                            return Ok(());
                        }
                    }
                    QueueState::Draining | QueueState::Closed => {
                        return Err(crate::Error::QueueClosed);
                    }
                }
            }
            // Another producer may win the freed slot; loop and re-check.
            slot_free.await;
        }
    }

    /// Removes the oldest buffered item, suspending while the queue is empty
    /// and still `Open` or `Draining`.
    ///
    /// Returns `None` once the queue is empty **and** draining: the first
    /// consumer to observe that condition transitions the queue to `Closed`
    /// and every current and future `pop` returns `None` - the analogue of
    /// reading from a closed channel.
    pub async fn pop(&self) -> Option<WorkItem<T>> {
        loop {
            let item_ready = self.item_ready.notified();
            {
                let mut inner = self.inner.lock();
                if let Some(item) = inner.buf.pop_front() {
                    let last_drained = inner.state == QueueState::Draining && inner.buf.is_empty();
                    drop(inner);
                    self.slot_free.notify_one();
                    if last_drained {
                        // Wake suspended siblings so one of them closes the
                        // queue instead of waiting out this item's processing.
                        self.item_ready.notify_waiters();
                    }
                    return Some(item);
                }
                match inner.state {
                    QueueState::Open => {}
                    QueueState::Draining => {
                        inner.state = QueueState::Closed;
                        drop(inner);
                        // Release every sibling consumer suspended here.
                        self.item_ready.notify_waiters();
                        return None;
                    }
                    QueueState::Closed => return None,
                }
            }
            item_ready.await;
        }
    }

    /// Transitions `Open → Draining`. Idempotent: a no-op if the queue is
    /// already `Draining` or `Closed`.
    ///
    /// Suspended producers are woken to observe the refusal; suspended
    /// consumers are woken so an empty queue closes promptly.
    pub fn begin_drain(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.state != QueueState::Open {
                return;
            }
            inner.state = QueueState::Draining;
        }
        self.slot_free.notify_waiters();
        self.item_ready.notify_waiters();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> QueueState {
        self.inner.lock().state
    }

    /// Number of items currently buffered.
    pub fn len(&self) -> usize {
        self.inner.lock().buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity set at construction.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
