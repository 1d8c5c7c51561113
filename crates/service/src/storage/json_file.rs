use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use models::document::{Collection, Document, Filter};
use tokio::fs;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::storage::{memory, memory::MemoryStore, DocumentStore};

/// JSON file-backed document store.
///
/// Each collection lives in `<dir>/<collection>.json` as an array of
/// documents. Files are loaded once at construction and rewritten while the
/// write lock is held, so a mutation and its persistence are one step.
/// Intended for small single-node deployments where a database is overkill.
pub struct JsonFileStore {
    mem: MemoryStore,
    dir: PathBuf,
}

impl JsonFileStore {
    /// Load every collection file under `dir`, creating empty ones if missing.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(ServiceError::db)?;

        let mut collections = HashMap::new();
        for collection in Collection::ALL {
            let path = file_for(&dir, collection);
            let docs: Vec<Document> = match fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice(&bytes)
                    .map_err(|e| ServiceError::Db(format!("corrupt {}: {e}", path.display())))?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    write_atomic(&path, b"[]").await?;
                    Vec::new()
                }
                Err(e) => return Err(ServiceError::db(e)),
            };
            debug!(%collection, count = docs.len(), "loaded collection file");
            collections.insert(collection, docs);
        }
        info!(dir = %dir.display(), "json file store ready");

        Ok(Arc::new(Self { mem: MemoryStore::from_collections(collections), dir }))
    }

    async fn save(&self, collection: Collection, docs: &[Document]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(docs).map_err(ServiceError::db)?;
        write_atomic(&file_for(&self.dir, collection), &data).await
    }
}

fn file_for(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.as_str()))
}

/// Write to a sibling temp file then rename, so readers never see half a file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), ServiceError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(ServiceError::db)?;
    fs::rename(&tmp, path).await.map_err(ServiceError::db)?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), ServiceError> {
        let mut map = self.mem.lock().write().await;
        let docs = map.entry(collection).or_default();
        memory::push_unique(docs, collection, doc)?;
        if let Err(e) = self.save(collection, docs).await {
            // keep memory and disk in agreement
            docs.pop();
            return Err(e);
        }
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, ServiceError> {
        self.mem.find_all(collection).await
    }

    async fn find_one_and_update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, ServiceError> {
        let mut map = self.mem.lock().write().await;
        let docs = map.entry(collection).or_default();
        let snapshot = docs.clone();
        let updated = memory::update_first(docs, filter, patch);
        if updated.is_some() {
            if let Err(e) = self.save(collection, docs).await {
                *docs = snapshot;
                return Err(e);
            }
        }
        Ok(updated)
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, ServiceError> {
        let mut map = self.mem.lock().write().await;
        let docs = map.entry(collection).or_default();
        let snapshot = docs.clone();
        let removed = memory::delete_first(docs, filter);
        if removed > 0 {
            if let Err(e) = self.save(collection, docs).await {
                *docs = snapshot;
                return Err(e);
            }
        }
        Ok(removed)
    }

    async fn close(&self) -> Result<(), ServiceError> {
        let map = self.mem.lock().read().await;
        for (collection, docs) in map.iter() {
            self.save(*collection, docs).await?;
        }
        info!(dir = %self.dir.display(), "json file store flushed");
        Ok(())
    }
}
