#![cfg(test)]
use std::sync::Arc;

use crate::storage::{memory::MemoryStore, seaorm::SeaOrmDocumentStore, DocumentStore};

pub fn memory_store() -> Arc<dyn DocumentStore> {
    Arc::new(MemoryStore::new())
}

/// Postgres store for tests, or `None` when `SKIP_DB_TESTS` is set or no
/// `DATABASE_URL` is available.
pub async fn postgres_store() -> Result<Option<SeaOrmDocumentStore>, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL missing; skip postgres store tests");
        return Ok(None);
    };
    let cfg = configs::DatabaseConfig { url, min_connections: 1, ..configs::DatabaseConfig::default() };
    Ok(Some(SeaOrmDocumentStore::connect(&cfg).await?))
}
