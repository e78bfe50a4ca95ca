//! Error types for the work intake pipeline.
//!
//! This module defines the central `Error` enum for the synchronous
//! submission and shutdown surfaces, and the separate [`ProcessingFault`]
//! value for failures on the asynchronous processing path.
//!
//! ## Error Cases
//! - `QueueClosed`: A submission arrived after draining had begun; callers
//!   must treat it as "service unavailable", not retry internally.
//! - `Rejected`: Backpressure - the queue stayed full past the caller's
//!   submission timeout. Callers may retry with their own policy.
//! - `PartialShutdown`: The grace deadline elapsed with workers still
//!   running; reported to the operator, never raised as a crash.
//!
//! A [`ProcessingFault`] is deliberately *not* a variant of [`Error`]: by the
//! time an item fails, its submitter has already received an acceptance
//! acknowledgement, so the fault is contained to that item's worker
//! iteration and surfaced only through observability events.

use core::time::Duration;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the submission and shutdown surfaces.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The queue no longer accepts new items (draining or closed).
    #[error("queue is closed to new submissions")]
    QueueClosed,

    /// The queue stayed at capacity past the caller's submission timeout.
    #[error("submission rejected: queue still full after {waited:?}")]
    Rejected { waited: Duration },

    /// The grace deadline elapsed before every worker joined.
    #[error("partial shutdown: {abandoned} worker(s) abandoned mid-processing")]
    PartialShutdown { abandoned: usize },
}

/// Failure while executing a single item's work.
///
/// Isolated to that item and that worker iteration: the worker logs the
/// fault, discards the item (processing is best-effort, not a durable
/// queue), and moves on to the next item.
#[derive(Clone, thiserror::Error, Debug)]
#[error("processing fault: {reason}")]
pub struct ProcessingFault {
    reason: String,
}

impl ProcessingFault {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
