//! Storage abstractions for the service layer
//!
//! Every service talks to an `Arc<dyn DocumentStore>` constructed once at
//! startup. Backends: in-process memory, JSON files, Postgres via SeaORM.

pub mod json_file;
pub mod memory;
pub mod seaorm;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{StorageBackend, StorageConfig};
use models::document::{Collection, Document, Filter};
use tracing::info;

use crate::errors::ServiceError;

/// Minimal document-database surface: one call per logical operation, each
/// atomic with respect to the others on the same store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and `/health`.
    fn backend(&self) -> &'static str;

    /// Insert one document. It must carry a string `id` unique within the collection.
    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), ServiceError>;

    /// All documents, newest `createdAt` first.
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, ServiceError>;

    /// Merge `patch` into the first document matching `filter` and return
    /// the merged document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, ServiceError>;

    /// Delete the first document matching `filter`; returns how many were removed.
    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, ServiceError>;

    /// Release connections / flush state. The store must not be used afterwards.
    async fn close(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}

/// Build the backend selected in `[storage]`.
pub async fn open(cfg: &StorageConfig) -> Result<Arc<dyn DocumentStore>, ServiceError> {
    let store: Arc<dyn DocumentStore> = match cfg.backend {
        StorageBackend::Memory => Arc::new(memory::MemoryStore::new()),
        StorageBackend::File => json_file::JsonFileStore::open(&cfg.data_dir).await?,
        StorageBackend::Postgres => Arc::new(seaorm::SeaOrmDocumentStore::connect(&cfg.database).await?),
    };
    info!(backend = store.backend(), "document store opened");
    Ok(store)
}
