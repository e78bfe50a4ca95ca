use anyhow::bail;
use clap::Parser;
use conveyor::PipelineConfig;
use core::time::Duration;

/// Runtime configuration for the `conveyor-server` binary.
///
/// These settings control the buffering, concurrency, and shutdown behavior
/// of every domain pipeline. All values are parsed from CLI arguments or
/// environment variables, with defaults suitable for local operation, and
/// are fixed for the lifetime of the process.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "conveyor-server",
    version,
    about = "An HTTP intake service feeding bounded background worker pipelines"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Capacity of each domain's work queue.
    ///
    /// Submissions beyond this bound wait (or are rejected, see
    /// `SUBMIT_TIMEOUT_MILLIS`) instead of growing memory - an overloaded
    /// service slows its callers rather than falling over.
    ///
    /// Environment variable: `QUEUE_CAPACITY`
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 10)]
    pub queue_capacity: usize,

    /// Number of background workers per domain pipeline.
    ///
    /// Workers are long-lived tasks created at startup; the pool is never
    /// resized at runtime.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 3)]
    pub num_workers: usize,

    /// Simulated processing time per item, in milliseconds.
    ///
    /// Stands in for real domain work; every popped item holds its worker
    /// for this long.
    ///
    /// Environment variable: `PROCESSING_MILLIS`
    #[arg(long, env = "PROCESSING_MILLIS", default_value_t = 2000)]
    pub processing_millis: u64,

    /// How long a request may wait on a full queue before being answered
    /// with 503, in milliseconds. `0` waits indefinitely.
    ///
    /// Environment variable: `SUBMIT_TIMEOUT_MILLIS`
    #[arg(long, env = "SUBMIT_TIMEOUT_MILLIS", default_value_t = 1000)]
    pub submit_timeout_millis: u64,

    /// Grace deadline for shutdown, in milliseconds: how long each pipeline
    /// may take to drain and join its workers before they are abandoned.
    ///
    /// Environment variable: `GRACE_MILLIS`
    #[arg(long, env = "GRACE_MILLIS", default_value_t = 5000)]
    pub grace_millis: u64,
}

/// Validated server configuration derived from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub pipeline: PipelineConfig,
    pub processing: Duration,
    pub grace: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.queue_capacity == 0 {
            bail!("QUEUE_CAPACITY must be greater than 0");
        }

        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        // Zero means "suspend the caller until a slot frees", the classic
        // blocking-handler configuration.
        let submit_timeout = (args.submit_timeout_millis > 0)
            .then(|| Duration::from_millis(args.submit_timeout_millis));

        Ok(Self {
            server_addr: args.server_addr,
            pipeline: PipelineConfig {
                queue_capacity: args.queue_capacity,
                num_workers: args.num_workers,
                submit_timeout,
            },
            processing: Duration::from_millis(args.processing_millis),
            grace: Duration::from_millis(args.grace_millis),
        })
    }
}
