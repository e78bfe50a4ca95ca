//! Structured logging initialization for the intake service.
//!
//! The per-item observability events (`item received`, `item processing
//! started`/`completed`/`failed`) are emitted by the pipeline library as
//! `tracing` events; this module installs the subscriber that turns them
//! into console output.
//!
//! ## Behavior
//!
//! - Pulls filtering rules from `RUST_LOG` or defaults to `info`.
//! - Pretty-printed output with thread ID, file, and line number.
//! - Timestamped using local time (RFC 3339 format).

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber for the process.
///
/// Call once, before the first pipeline is constructed, so startup and
/// worker lifecycle events are captured too.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .init();
}
