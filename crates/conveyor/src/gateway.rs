//! Thin adapter converting inbound requests into queued work items.

use crate::error::{Error, Result};
use crate::item::{ItemId, WorkItem};
use crate::queue::WorkQueue;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

/// Submission side of the pipeline: the only writer to the queue.
///
/// The gateway observes the coordinator's stop token to decide whether to
/// accept at all, assigns each accepted payload a fresh [`ItemId`], and
/// applies the configured admission policy for a full queue. The id counter
/// is initialized at construction, before any concurrent use - there is no
/// lazily created state on the submission path.
pub struct IngressGateway<T> {
    queue: Arc<WorkQueue<T>>,
    stop: CancellationToken,
    next_id: AtomicU64,
    submit_timeout: Option<Duration>,
}

impl<T> IngressGateway<T> {
    pub(crate) fn new(
        queue: Arc<WorkQueue<T>>,
        stop: CancellationToken,
        submit_timeout: Option<Duration>,
    ) -> Self {
        Self {
            queue,
            stop,
            next_id: AtomicU64::new(1),
            submit_timeout,
        }
    }

    /// Wraps `payload` in a [`WorkItem`] and buffers it for processing.
    ///
    /// The returned id acknowledges *acceptance*, not completion -
    /// everything past this point is fire-and-forget, observable only
    /// through per-item events.
    ///
    /// # Errors
    ///
    /// - [`Error::QueueClosed`] once shutdown has begun; callers should
    ///   surface this as service-unavailable.
    /// - [`Error::Rejected`] when the queue stays at capacity past the
    ///   configured submission timeout. With no timeout configured the call
    ///   suspends until a slot frees (unbounded backpressure).
    pub async fn submit(&self, payload: T) -> Result<ItemId> {
        if self.stop.is_cancelled() {
            return Err(Error::QueueClosed);
        }

        let id = ItemId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let item = WorkItem::new(id, payload);

        match self.submit_timeout {
            None => self.queue.push(item).await?,
            Some(waited) => match tokio::time::timeout(waited, self.queue.push(item)).await {
                Ok(pushed) => pushed?,
                Err(_) => {
                    tracing::debug!(
                        item_id = %id,
                        waited_ms = waited.as_millis() as u64,
                        "submission rejected by backpressure"
                    );
                    return Err(Error::Rejected { waited });
                }
            },
        }

        tracing::info!(item_id = %id, queue_depth = self.queue.len(), "item received");
        Ok(id)
    }

    /// The admission timeout applied when the queue is full; `None` means
    /// suspend indefinitely.
    pub const fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout
    }
}
