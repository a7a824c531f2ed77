//! nsview demo server
//!
//! ```bash
//! # Defaults: 127.0.0.1:8080, base path "/", bundled domains/
//! cargo run -p nsview-demo
//!
//! # Serve under /app with a config file
//! cargo run -p nsview-demo -- --config nsview.toml --base-path /app
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nsview_demo::{build_renderer, router, DemoConfig};

#[derive(Debug, Parser)]
#[command(name = "nsview-demo", version, about = "Serve the nsview example domains")]
struct Cli {
    /// Config file (default: ./nsview.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Override the base path
    #[arg(long)]
    base_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nsview=info,nsview_demo=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = DemoConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }
    if let Some(base_path) = cli.base_path {
        config.base_path = base_path;
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting nsview demo");
    let renderer = build_renderer(&config)?;
    let namespaces: Vec<&str> = renderer.namespaces().collect();
    info!(?namespaces, base_path = renderer.base_path(), "Renderer ready");

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("bind {}", config.listen))?;
    info!(address = %config.listen, "Listening");

    axum::serve(listener, router(renderer))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run service")?;

    info!("Shutting down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
