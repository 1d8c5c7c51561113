//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use tracing::{info, warn};

/// Ensure the data and upload directories exist.
///
/// The data directory is only required by the file backend, so a failure to
/// create it is a warning; the upload directory is always required.
pub async fn ensure_env(data_dir: &str, uploads_dir: &str) -> anyhow::Result<()> {
    if let Err(e) = tokio::fs::create_dir_all(data_dir).await {
        warn!(%data_dir, error = %e, "cannot create data directory");
    }
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {uploads_dir}: {e}"))?;
    info!(%data_dir, %uploads_dir, "runtime directories ready");
    Ok(())
}
