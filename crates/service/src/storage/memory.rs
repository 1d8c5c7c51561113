use std::collections::HashMap;

use async_trait::async_trait;
use models::document::{self, Collection, Document, Filter};
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// In-process store. Nothing survives a restart; used by tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_collections(collections: HashMap<Collection, Vec<Document>>) -> Self {
        Self { inner: RwLock::new(collections) }
    }

    pub(crate) fn lock(&self) -> &RwLock<HashMap<Collection, Vec<Document>>> {
        &self.inner
    }
}

/// Documents are kept in insertion order; reversing before the stable sort
/// puts later inserts first among equal timestamps.
pub(crate) fn newest_first(docs: &[Document]) -> Vec<Document> {
    let mut out: Vec<Document> = docs.iter().rev().cloned().collect();
    out.sort_by(|a, b| document::created_at_of(b).cmp(&document::created_at_of(a)));
    out
}

pub(crate) fn push_unique(docs: &mut Vec<Document>, collection: Collection, doc: Document) -> Result<(), ServiceError> {
    let id = document::id_of(&doc)
        .ok_or_else(|| ServiceError::Db(format!("document for {collection} has no string id")))?;
    if docs.iter().any(|d| document::id_of(d) == Some(id)) {
        return Err(ServiceError::Db(format!("duplicate id {id} in {collection}")));
    }
    docs.push(doc);
    Ok(())
}

pub(crate) fn update_first(docs: &mut [Document], filter: &Filter, patch: Document) -> Option<Document> {
    let found = docs.iter_mut().find(|d| filter.matches(d))?;
    document::merge(found, patch);
    Some(found.clone())
}

pub(crate) fn delete_first(docs: &mut Vec<Document>, filter: &Filter) -> u64 {
    match docs.iter().position(|d| filter.matches(d)) {
        Some(idx) => {
            docs.remove(idx);
            1
        }
        None => 0,
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        push_unique(map.entry(collection).or_default(), collection, doc)
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(&collection).map(|docs| newest_first(docs)).unwrap_or_default())
    }

    async fn find_one_and_update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.get_mut(&collection).and_then(|docs| update_first(docs, filter, patch)))
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.get_mut(&collection).map(|docs| delete_first(docs, filter)).unwrap_or(0))
    }
}
