//! fhi-store - central record store for family health intake
//!
//! Serves `/api/records` over HTTP and persists records in
//! `<root folder>/fhi-store.db`.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fhi_common::config::{resolve_root_folder, TomlConfig};
use fhi_store::{api, build_router, db, AppState, DEFAULT_PORT};
use tokio::signal;
use tracing::info;

/// Command-line arguments for fhi-store
#[derive(Parser, Debug)]
#[command(name = "fhi-store")]
#[command(about = "Central record store for family health intake")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "FHI_STORE_PORT")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "FHI_STORE_HOST")]
    host: std::net::IpAddr,

    /// Folder holding the record database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = TomlConfig::load_or_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fhi_store={},tower_http=info", config.log_level).into()),
        )
        .init();

    let build = api::BUILD_INFO;
    info!(
        version = build.version,
        git = build.git_hash,
        built = build.build_timestamp,
        profile = build.build_profile,
        "Starting fhi-store"
    );

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let db_path = root_folder.join(db::DATABASE_FILE);
    info!("Database path: {}", db_path.display());

    let pool = db::connect(&db_path)
        .await
        .context("Failed to open record database")?;

    let app = build_router(AppState::new(pool));

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("fhi-store listening on http://{}", addr);
    info!("Records endpoint: http://{}/api/records", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
