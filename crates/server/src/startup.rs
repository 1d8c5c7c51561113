use std::sync::Arc;

use axum::Router;
use configs::AppConfig;
use dotenvy::dotenv;
use service::{media::MediaUploads, runtime, storage};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file when present, else env fallbacks; `.env` is loaded first.
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenv().ok();
    AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Build the store and the router from a loaded config.
pub async fn build_app(cfg: &AppConfig) -> Result<(Router, AppState), StartupError> {
    runtime::ensure_env(&cfg.storage.data_dir, &cfg.uploads.dir).await?;
    service::metrics::init();

    let store = storage::open(&cfg.storage).await?;
    let uploads = MediaUploads::new(&cfg.uploads.dir, cfg.uploads.max_bytes);
    let state = AppState::new(Arc::clone(&store), &cfg.shop, uploads);
    let app = routes::build_router(state.clone(), build_cors());
    Ok((app, state))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Serve until a shutdown signal, then close the store.
pub async fn serve(cfg: AppConfig) -> Result<(), StartupError> {
    let (app, state) = build_app(&cfg).await?;
    let addr = cfg.server.bind_addr()?;
    info!(%addr, backend = state.store.backend(), "starting breezy server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Any(anyhow::anyhow!("bind {addr}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Any(e.into()))?;

    info!("server stopped accepting connections");
    state.store.close().await?;
    info!("shutdown complete");
    Ok(())
}
