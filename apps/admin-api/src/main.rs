//! # Stockroom Admin API server
//!
//! ```text
//! admin-api [CONFIG_FILE]
//!
//!   CONFIG_FILE   TOML file (default: ./stockroom.toml when present)
//!   STOCKROOM__SERVER__PORT=9000 and friends override any key
//!   RUST_LOG overrides logging.filter
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use stockroom_admin_api::config::{AppConfig, DEFAULT_CONFIG_FILE};
use stockroom_admin_api::storage::MediaStorage;
use stockroom_admin_api::{router, AppState};
use stockroom_db::Database;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging.filter);
    let config_file = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    info!(file = %config_file.display(), "Configuration loaded");
    info!("Starting Stockroom admin API...");
    info!(
        db = %config.database.path.display(),
        media = %config.media.root.display(),
        "Storage paths"
    );

    let db = Database::new(config.database.to_db_config())
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let storage = MediaStorage::from_config(&config.media);
    tokio::fs::create_dir_all(storage.root())
        .await
        .with_context(|| format!("Failed to create media root {}", storage.root().display()))?;

    let addr = config.bind_address();
    let state = Arc::new(AppState { db, storage, config });
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
