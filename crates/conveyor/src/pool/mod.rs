//! Fixed-size pool of long-lived worker tasks draining the [`WorkQueue`].
//!
//! Workers are created once at startup and never resized. Each worker loops
//! on [`WorkQueue::pop`] and terminates only when the queue reports drained -
//! never because a stop signal fired while items remained buffered. Making
//! queue state the sole termination condition removes the nondeterministic
//! race of selecting between "item available" and "stop requested" as
//! equally-ready alternatives, under which buffered items may or may not be
//! processed at shutdown.

mod worker;

#[cfg(test)]
mod tests;

use crate::error::ProcessingFault;
use crate::item::WorkItem;
use crate::queue::WorkQueue;
use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};

pub(crate) type ProcessFuture = BoxFuture<'static, Result<(), ProcessingFault>>;

/// The processing function plugged into every worker. Kept boxed so the pool
/// itself stays non-generic over the caller's closure type.
pub(crate) type ProcessFn<T> = Arc<dyn Fn(WorkItem<T>) -> ProcessFuture + Send + Sync>;

/// A fixed set of worker tasks, created once, joined at shutdown.
///
/// Worker lifecycle is `Running → Stopping → Terminated`: running while the
/// queue yields items, stopping once it observes the drained queue, and
/// terminated when its task completes and is joined.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `num_workers` worker tasks draining `queue`.
    ///
    /// # Panics
    /// Panics if `num_workers` is zero.
    pub(crate) fn spawn<T: Send + 'static>(
        num_workers: usize,
        queue: Arc<WorkQueue<T>>,
        process: ProcessFn<T>,
    ) -> Self {
        assert!(num_workers > 0, "worker pool must have at least 1 worker");

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            handles.push(tokio::spawn(worker::worker_loop(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&process),
            )));
        }
        Self { handles }
    }

    /// Number of workers in the pool.
    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    /// Joins every worker, bounded by a shared deadline.
    ///
    /// Returns the number of workers that had not terminated when the
    /// deadline elapsed. Their handles are dropped, which detaches the tasks:
    /// a worker abandoned mid-processing finishes (or fails) on its own, but
    /// nothing waits for it anymore.
    pub(crate) async fn join(self, deadline: Instant) -> usize {
        let mut abandoned = 0;
        for (worker_id, handle) in self.handles.into_iter().enumerate() {
            match timeout_at(deadline, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    // Per-item faults are contained inside the loop, so this
                    // only fires if the loop itself was cancelled or died.
                    tracing::error!(worker_id, error = %e, "worker task did not join cleanly");
                }
                Err(_) => {
                    abandoned += 1;
                    tracing::warn!(worker_id, "worker still busy at grace deadline, abandoning");
                }
            }
        }
        abandoned
    }
}
