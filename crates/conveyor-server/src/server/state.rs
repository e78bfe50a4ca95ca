//! Shared application state: one pipeline per processing domain.
//!
//! All four pipelines are constructed in [`AppState::new`], before the
//! listener accepts its first connection - collaborators receive handles to
//! already-initialized state, never lazily created globals.

use crate::server::config::ServerConfig;
use conveyor::{Error, Pipeline, ShutdownPhase, WorkItem};
use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use super::domain::{Item, Order, Payment, User};

/// Handles to the per-domain pipelines, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<Pipeline<Order>>,
    pub items: Arc<Pipeline<Item>>,
    pub payments: Arc<Pipeline<Payment>>,
    pub users: Arc<Pipeline<User>>,
}

impl AppState {
    /// Builds the four domain pipelines from one shared configuration.
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            orders: simulated_pipeline(config, "order"),
            items: simulated_pipeline(config, "item"),
            payments: simulated_pipeline(config, "payment"),
            users: simulated_pipeline(config, "user"),
        }
    }

    /// True until shutdown has been requested on any pipeline.
    pub fn is_serving(&self) -> bool {
        self.orders.phase() == ShutdownPhase::Active
            && self.items.phase() == ShutdownPhase::Active
            && self.payments.phase() == ShutdownPhase::Active
            && self.users.phase() == ShutdownPhase::Active
    }

    /// Begins graceful shutdown on every domain pipeline. Idempotent.
    pub fn request_stop(&self) {
        self.orders.request_stop();
        self.items.request_stop();
        self.payments.request_stop();
        self.users.request_stop();
    }

    /// Waits for each pipeline to drain and join its workers.
    ///
    /// A pipeline that misses the grace deadline is logged as a
    /// partial shutdown and the rest proceed - an incomplete drain is an
    /// operator concern, never a crash.
    pub async fn await_terminated(&self, grace: Duration) {
        report("order", self.orders.await_terminated(grace).await);
        report("item", self.items.await_terminated(grace).await);
        report("payment", self.payments.await_terminated(grace).await);
        report("user", self.users.await_terminated(grace).await);
    }
}

fn report(domain: &'static str, outcome: conveyor::Result<()>) {
    match outcome {
        Ok(()) => tracing::info!(domain, "pipeline terminated cleanly"),
        Err(Error::PartialShutdown { abandoned }) => {
            tracing::warn!(domain, abandoned, "partial shutdown, workers abandoned");
        }
        Err(e) => tracing::error!(domain, error = %e, "unexpected shutdown error"),
    }
}

/// Spawns one domain pipeline whose processor is a fixed-duration simulated
/// operation - the seam where real deployments plug in actual work.
fn simulated_pipeline<T>(config: &ServerConfig, domain: &'static str) -> Arc<Pipeline<T>>
where
    T: fmt::Debug + Send + 'static,
{
    let processing = config.processing;
    Arc::new(Pipeline::new(
        config.pipeline.clone(),
        move |item: WorkItem<T>| async move {
            tokio::time::sleep(processing).await;
            tracing::info!(domain, item_id = %item.id(), payload = ?item.payload(), "processed");
            Ok(())
        },
    ))
}
