//! The worker loop: pop, process, repeat until the queue drains.

use super::ProcessFn;
use crate::queue::WorkQueue;
use core::any::Any;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Runs one worker until the queue reports drained.
///
/// Each iteration takes exactly one of two actions, resolved in this order:
/// process the next popped item, or - on `None` - terminate. A fault or
/// panic while processing an item is logged and contained to that iteration;
/// the item is discarded (no automatic retry) and the loop continues, so one
/// bad item never takes down a worker or its siblings.
pub(crate) async fn worker_loop<T: Send + 'static>(
    worker_id: usize,
    queue: Arc<WorkQueue<T>>,
    process: ProcessFn<T>,
) {
    tracing::trace!(worker_id, "worker started");

    while let Some(item) = queue.pop().await {
        let item_id = item.id();
        tracing::info!(
            worker_id,
            item_id = %item_id,
            queued_for_ms = item.queued_for().as_millis() as u64,
            "item processing started"
        );

        let started = Instant::now();
        match AssertUnwindSafe(process(item)).catch_unwind().await {
            Ok(Ok(())) => {
                tracing::info!(
                    worker_id,
                    item_id = %item_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "item processing completed"
                );
            }
            Ok(Err(fault)) => {
                tracing::warn!(
                    worker_id,
                    item_id = %item_id,
                    reason = fault.reason(),
                    "item processing failed"
                );
            }
            Err(panic) => {
                tracing::error!(
                    worker_id,
                    item_id = %item_id,
                    reason = panic_reason(panic.as_ref()),
                    "item processing failed"
                );
            }
        }
    }

    tracing::trace!(worker_id, "worker stopped");
}

/// Best-effort extraction of a human-readable message from a panic payload.
fn panic_reason(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
