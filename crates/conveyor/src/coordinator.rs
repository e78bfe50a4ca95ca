//! Shutdown orchestration: stop accepting, drain, join.
//!
//! The [`ShutdownCoordinator`] is the single authority over the queue's
//! lifecycle transitions and the worker join. Everyone else only reads:
//! workers observe the queue, the gateway observes the cancellation token.
//! Phase transitions are strictly monotonic and written once each, so no
//! compare-and-swap loops are needed beyond the idempotence guard on
//! [`request_stop`](ShutdownCoordinator::request_stop).

use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use crate::queue::WorkQueue;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Coordinator lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownPhase {
    /// Submissions accepted; workers processing normally.
    Active = 0,
    /// An external stop was requested; drain is about to begin.
    StopRequested = 1,
    /// No new submissions; waiting for workers to drain the queue and join.
    Draining = 2,
    /// All workers joined, or the grace deadline elapsed.
    Terminated = 3,
}

impl ShutdownPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Active,
            1 => Self::StopRequested,
            2 => Self::Draining,
            _ => Self::Terminated,
        }
    }
}

/// Orchestrates graceful termination of a queue/pool pair.
///
/// Owns no data beyond coordination state; constructed exactly once per
/// pipeline and shared by reference - never ambient global state.
pub struct ShutdownCoordinator<T> {
    queue: Arc<WorkQueue<T>>,
    pool: Mutex<Option<WorkerPool>>,
    stop: CancellationToken,
    phase: AtomicU8,
    abandoned: AtomicUsize,
}

impl<T> ShutdownCoordinator<T> {
    pub(crate) fn new(queue: Arc<WorkQueue<T>>, pool: WorkerPool, stop: CancellationToken) -> Self {
        Self {
            queue,
            pool: Mutex::new(Some(pool)),
            stop,
            phase: AtomicU8::new(ShutdownPhase::Active as u8),
            abandoned: AtomicUsize::new(0),
        }
    }

    /// Begins graceful shutdown: refuse new submissions, mark the queue
    /// draining. Idempotent - a second call has no observable effect.
    ///
    /// Returns immediately; use
    /// [`await_terminated`](Self::await_terminated) to wait for the drain to
    /// finish.
    pub fn request_stop(&self) {
        if self
            .phase
            .compare_exchange(
                ShutdownPhase::Active as u8,
                ShutdownPhase::StopRequested as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return;
        }

        tracing::info!("stop requested, refusing new submissions");
        self.stop.cancel();
        self.queue.begin_drain();
        self.phase
            .store(ShutdownPhase::Draining as u8, Ordering::Release);
        tracing::info!("draining buffered items");
    }

    /// Waits for every worker to observe the drained queue and terminate,
    /// bounded by `grace`.
    ///
    /// Call after [`request_stop`](Self::request_stop); invoked without a
    /// prior stop, no worker ever observes a drained queue and the call
    /// degrades to reporting a partial shutdown once `grace` elapses.
    /// Subsequent calls reproduce the first call's outcome.
    ///
    /// # Errors
    ///
    /// [`Error::PartialShutdown`] if the grace deadline elapsed first -
    /// workers still mid-processing are abandoned rather than waited on
    /// indefinitely. The queue-level drain itself never times out; the
    /// deadline is purely a join policy.
    pub async fn await_terminated(&self, grace: Duration) -> Result<()> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.take() {
            let abandoned = pool.join(Instant::now() + grace).await;
            self.abandoned.store(abandoned, Ordering::Release);
            self.phase
                .store(ShutdownPhase::Terminated as u8, Ordering::Release);
            if abandoned == 0 {
                tracing::info!("all workers joined, pipeline terminated");
            } else {
                tracing::warn!(abandoned, "grace deadline elapsed, partial shutdown");
            }
        }
        drop(slot);

        match self.abandoned.load(Ordering::Acquire) {
            0 => Ok(()),
            abandoned => Err(Error::PartialShutdown { abandoned }),
        }
    }

    /// Current coordinator phase.
    pub fn phase(&self) -> ShutdownPhase {
        ShutdownPhase::from_u8(self.phase.load(Ordering::Acquire))
    }
}
