//! pressured — the queue pressure daemon.
//!
//! Computes backlog-per-worker pressure and publishes it as the
//! `QueueDepthPressure` metric. It has no timer of its own: an external
//! scheduler either runs `pressured invoke` on its cadence or calls
//! `POST /invoke` on a running `pressured serve`.
//!
//! # Usage
//!
//! ```text
//! QUEUE_URL=orders ECS_CLUSTER_NAME=batch ECS_SERVICE_NAME=order-worker \
//!     pressured --config /etc/pressure.toml serve --port 8080
//!
//! pressured invoke --dry-run --backlog 100 --workers 4
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use pressure_api::{ApiState, build_router, cycle_response};
use pressure_core::{PressureConfig, ReporterConfig};

mod wiring;

use wiring::Wiring;

#[derive(Parser)]
#[command(name = "pressured", about = "Queue depth pressure reporter", version)]
struct Cli {
    /// Configuration file with identifiers and endpoints.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run one evaluation cycle, print the result, and exit.
    ///
    /// Exits 0 when the metric was published and 1 otherwise.
    Invoke {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Serve `POST /invoke` for an external scheduler.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Use fixed in-memory counts instead of the configured endpoints.
    #[arg(long)]
    dry_run: bool,

    /// Backlog reported in dry-run mode.
    #[arg(long, default_value = "0", requires = "dry_run")]
    backlog: u64,

    /// Running workers reported in dry-run mode.
    #[arg(long, default_value = "0", requires = "dry_run")]
    workers: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let file = match &cli.config {
        Some(path) => PressureConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PressureConfig::default(),
    };
    let config = file.reporter_config();
    log_config(&config);

    match cli.command {
        Command::Invoke { source } => {
            let wiring = wire(&file, &source)?;
            run_invoke(wiring, &config).await
        }
        Command::Serve { port, source } => {
            let wiring = wire(&file, &source)?;
            run_serve(wiring, config, port).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,pressured=debug,pressure_reporter=debug,pressure_sources=debug",
        )
    });

    // Logs go to stderr; stdout carries `invoke` output.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn log_config(config: &ReporterConfig) {
    info!(
        queue = %config.queue_id,
        cluster = %config.cluster_id,
        service = %config.service_id,
        "identifiers loaded"
    );
    if let Err(e) = config.validate() {
        warn!(error = %e, "configuration incomplete; every cycle will fail until fixed");
    }
}

fn wire(file: &PressureConfig, source: &SourceArgs) -> anyhow::Result<Wiring> {
    if source.dry_run {
        return Ok(wiring::dry_run(source.backlog, source.workers));
    }
    let endpoints = file
        .endpoints
        .as_ref()
        .context("no [endpoints] section configured; pass --config or use --dry-run")?
        .resolve()?;
    Ok(wiring::from_endpoints(&endpoints))
}

async fn run_invoke(wiring: Wiring, config: &ReporterConfig) -> anyhow::Result<ExitCode> {
    let result = wiring.reporter.run_cycle(config).await;
    let (status, body) = cycle_response(&result);
    println!("{}", serde_json::to_string_pretty(&body)?);

    if let Some(gauge) = &wiring.gauge {
        print!("{}", gauge.render_prometheus());
    }

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_serve(wiring: Wiring, config: ReporterConfig, port: u16) -> anyhow::Result<()> {
    let router = build_router(ApiState {
        reporter: wiring.reporter,
        config: Arc::new(config),
        gauge: wiring.gauge,
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!(%addr, "invocation endpoint starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("pressured stopped");
    Ok(())
}
