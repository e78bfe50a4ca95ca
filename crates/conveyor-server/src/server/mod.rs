//! HTTP hosting layer around the domain pipelines.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration and validation.
//! - [`domain`] - the four intake payload types.
//! - [`ingress`] - axum router, submission handlers, health probe.
//! - [`state`] - shared application state (one pipeline per domain).
//! - [`telemetry`] - structured logging initialization.

pub mod config;
pub mod domain;
pub mod ingress;
pub mod state;
pub mod telemetry;
