use std::sync::Arc;

use models::document::Document;
use models::lead::LeadKind;
use serde_json::Value;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::metrics;
use crate::storage::DocumentStore;

/// Create/list for the append-only lead collections.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn DocumentStore>,
}

impl LeadService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, body))]
    pub async fn create(&self, kind: LeadKind, body: Value) -> Result<Document, ServiceError> {
        let Value::Object(body) = body else {
            return Err(ServiceError::Validation("request body must be a JSON object".into()));
        };
        let record = kind.build_record(body)?;
        self.store.insert(kind.collection(), record.clone()).await?;
        metrics::LEADS_CREATED_TOTAL.with_label_values(&[kind.singular()]).inc();
        info!(id = models::document::id_of(&record).unwrap_or_default(), "lead captured");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, kind: LeadKind) -> Result<Vec<Document>, ServiceError> {
        self.store.find_all(kind.collection()).await
    }
}
