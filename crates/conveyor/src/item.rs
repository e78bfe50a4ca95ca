//! The immutable unit of submitted work.

use core::fmt;
use std::time::Instant;

/// Opaque unique identifier for a [`WorkItem`], assigned at submission and
/// immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value, e.g. for wire responses.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable value submitted for processing.
///
/// Once constructed, a `WorkItem` is never mutated; it is processed exactly
/// once by exactly one worker. The payload is opaque to the pipeline -
/// domain content is the processor's concern.
#[derive(Debug)]
pub struct WorkItem<T> {
    id: ItemId,
    payload: T,
    enqueued_at: Instant,
}

impl<T> WorkItem<T> {
    pub(crate) fn new(id: ItemId, payload: T) -> Self {
        Self {
            id,
            payload,
            enqueued_at: Instant::now(),
        }
    }

    pub const fn id(&self) -> ItemId {
        self.id
    }

    pub const fn payload(&self) -> &T {
        &self.payload
    }

    /// Consumes the item, yielding its payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Time elapsed since submission. Observability only - the pipeline
    /// makes no scheduling decisions based on it.
    pub fn queued_for(&self) -> core::time::Duration {
        self.enqueued_at.elapsed()
    }
}
