//! One-shot operator tool: inline local testimonial uploads as `data:` URLs
//! in the configured document store.

use std::path::PathBuf;

use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = configs::AppConfig::load_or_env()?;
    common::utils::logging::init_logging(&cfg.server.log_format);

    // an explicit directory argument wins over [uploads].dir
    let uploads_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.uploads.dir));
    info!(backend = ?cfg.storage.backend, root = %uploads_root.display(), "starting media migration");

    let store = service::storage::open(&cfg.storage).await?;
    let result = service::media::migrate_local_media(store.clone(), &uploads_root).await;
    if let Err(e) = store.close().await {
        error!(error = %e, "failed to close store");
    }

    let report = result?;
    println!(
        "Migration complete. Updated {} testimonial(s); {} file(s) could not be read.",
        report.updated, report.failed_files
    );
    Ok(())
}
