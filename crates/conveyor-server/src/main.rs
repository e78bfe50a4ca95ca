#![doc = include_str!("../README.md")]

mod server;

use clap::Parser;
use core::time::Duration;
use server::config::{CliArgs, ServerConfig};
use server::ingress;
use server::state::AppState;
use server::telemetry::init_telemetry;
use tokio::net::TcpListener;
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    init_telemetry();

    // The pipelines exist before the listener accepts a single request, so
    // no submission can ever race their construction.
    let state = AppState::new(&config);
    let app = ingress::router(state.clone());

    let listener = TcpListener::bind(&config.server_addr).await?;
    log_startup_info(&config);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state, config.grace))
        .await?;

    tracing::info!("service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &ServerConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            "starting intake service on {} with full config: {:#?}",
            config.server_addr,
            config
        );
    } else {
        tracing::info!(
            "starting intake service on {} with {} workers per domain",
            config.server_addr,
            config.pipeline.num_workers
        );
    }
}

async fn shutdown_signal(state: AppState, grace: Duration) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("received SIGTERM signal");
        },
    }

    tracing::info!("shutdown signal received, terminating gracefully...");

    // 1. Refuse new submissions; /healthz flips to unavailable.
    state.request_stop();

    // 2. Drain every buffered item and join the workers before the listener
    //    stops; in-flight HTTP requests now receive 503s.
    state.await_terminated(grace).await;
}
