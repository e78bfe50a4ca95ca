//! The single-owner aggregate wiring queue, workers, gateway, and
//! coordinator together.
//!
//! A [`Pipeline`] is constructed explicitly, once, before any concurrent use
//! begins, and passed by reference to every collaborator. This replaces the
//! ambient pattern of package-global channels and wait groups initialized
//! lazily on first access - a pattern that races when two callers hit the
//! first access concurrently. Here there is nothing lazy to race on: by the
//! time a handle exists, the queue, the workers, and the coordinator all do
//! too.

#[cfg(test)]
mod tests;

use crate::coordinator::{ShutdownCoordinator, ShutdownPhase};
use crate::error::{ProcessingFault, Result};
use crate::gateway::IngressGateway;
use crate::item::{ItemId, WorkItem};
use crate::pool::{ProcessFn, WorkerPool};
use crate::queue::{QueueState, WorkQueue};
use core::future::Future;
use core::time::Duration;
use futures::FutureExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Construction-time settings for a [`Pipeline`]. None of these are mutable
/// at runtime.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fixed capacity of the work queue. Must be greater than 0.
    pub queue_capacity: usize,
    /// Number of long-lived workers. Must be greater than 0.
    pub num_workers: usize,
    /// How long a submission may wait on a full queue before being rejected;
    /// `None` suspends the submitter indefinitely.
    pub submit_timeout: Option<Duration>,
}

/// A bounded intake queue, a fixed worker pool, and their shutdown
/// coordinator, owned as one unit.
pub struct Pipeline<T> {
    gateway: IngressGateway<T>,
    coordinator: ShutdownCoordinator<T>,
    queue: Arc<WorkQueue<T>>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Builds the queue, spawns the workers, and wires up the coordinator.
    ///
    /// `process` runs once per item on whichever worker pops it. Returning
    /// `Err(ProcessingFault)` (or panicking) affects only that item.
    ///
    /// Must be called from within a Tokio runtime: workers are spawned here
    /// so that the pool exists before the first submission.
    ///
    /// # Panics
    /// Panics if `queue_capacity` or `num_workers` is zero.
    pub fn new<F, Fut>(config: PipelineConfig, process: F) -> Self
    where
        F: Fn(WorkItem<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<(), ProcessingFault>> + Send + 'static,
    {
        let queue = Arc::new(WorkQueue::new(config.queue_capacity));
        let stop = CancellationToken::new();

        let process: ProcessFn<T> = Arc::new(move |item| process(item).boxed());
        let pool = WorkerPool::spawn(config.num_workers, Arc::clone(&queue), process);

        tracing::debug!(
            queue_capacity = config.queue_capacity,
            num_workers = config.num_workers,
            "pipeline started"
        );

        Self {
            gateway: IngressGateway::new(Arc::clone(&queue), stop.clone(), config.submit_timeout),
            coordinator: ShutdownCoordinator::new(Arc::clone(&queue), pool, stop),
            queue,
        }
    }

    /// Submits a payload for background processing. See
    /// [`IngressGateway::submit`].
    pub async fn submit(&self, payload: T) -> Result<ItemId> {
        self.gateway.submit(payload).await
    }

    /// Begins graceful shutdown. Idempotent. See
    /// [`ShutdownCoordinator::request_stop`].
    pub fn request_stop(&self) {
        self.coordinator.request_stop();
    }

    /// Waits for the drain to finish and all workers to join, bounded by
    /// `grace`. See [`ShutdownCoordinator::await_terminated`].
    pub async fn await_terminated(&self, grace: Duration) -> Result<()> {
        self.coordinator.await_terminated(grace).await
    }

    /// Current shutdown phase.
    pub fn phase(&self) -> ShutdownPhase {
        self.coordinator.phase()
    }

    /// Current queue lifecycle state.
    pub fn queue_state(&self) -> QueueState {
        self.queue.state()
    }

    /// Number of items currently buffered.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// The submission adapter, for hosts that hand ingress and lifecycle to
    /// different collaborators.
    pub fn gateway(&self) -> &IngressGateway<T> {
        &self.gateway
    }

    /// The shutdown authority.
    pub fn coordinator(&self) -> &ShutdownCoordinator<T> {
        &self.coordinator
    }
}
