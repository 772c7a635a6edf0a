// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use dnspod_webhook::{
    constants::{DEFAULT_LISTEN_ADDR, DNSPOD_API_ENDPOINT, GROUP_NAME_ENV},
    solver::{DnspodSolver, Solver},
    webhook::{run_webhook_server, WebhookState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// cert-manager DNS-01 webhook solver for DNSPod
#[derive(Debug, Parser)]
#[command(name = "dnspod-webhook", version, about)]
struct Args {
    /// API group the webhook is registered under (must match the Issuer's `groupName`)
    #[arg(long, env = GROUP_NAME_ENV)]
    group_name: String,

    /// Address the webhook HTTP server listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    listen_addr: SocketAddr,

    /// Base URL of the DNSPod API
    #[arg(long, env = "DNSPOD_ENDPOINT", default_value = DNSPOD_API_ENDPOINT)]
    dnspod_endpoint: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("dnspod-webhook")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG (default INFO) and RUST_LOG_FORMAT (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(
        group = %args.group_name,
        endpoint = %args.dnspod_endpoint,
        "Starting DNSPod webhook solver"
    );

    debug!("Inferring Kubernetes configuration");
    let kube_config = kube::Config::infer()
        .await
        .context("failed to infer Kubernetes configuration")?;

    let (stop_tx, stop_rx) = watch::channel(false);

    let mut solver = DnspodSolver::new(&args.dnspod_endpoint);
    solver
        .initialize(kube_config, stop_rx)
        .await
        .context("failed to initialize DNSPod solver")?;
    info!(solver = solver.name(), "Solver initialized");

    let solver: Arc<dyn Solver> = Arc::new(solver);
    let state = WebhookState::new(&args.group_name, vec![solver]);

    let shutdown = async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    };

    run_webhook_server(args.listen_addr, state, shutdown).await
}

/// Resolve on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
