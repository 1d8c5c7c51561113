use async_trait::async_trait;
use chrono::Utc;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::document::{self, Collection, Document, Filter};
use models::stored_document;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement,
};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

// Both statements touch at most one row: the inner select picks it, the
// outer statement is a single atomic write.
const UPDATE_ONE_SQL: &str = r#"UPDATE "document" SET "body" = "body" || $3
WHERE "pk" = (SELECT "pk" FROM "document" WHERE "collection" = $1 AND "body" @> $2 LIMIT 1 FOR UPDATE)
RETURNING "body""#;

const DELETE_ONE_SQL: &str = r#"DELETE FROM "document"
WHERE "pk" = (SELECT "pk" FROM "document" WHERE "collection" = $1 AND "body" @> $2 LIMIT 1 FOR UPDATE)"#;

/// Postgres-backed store: one `document` table, JSONB bodies, containment filters.
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect with pool settings and apply pending migrations if configured.
    pub async fn connect(cfg: &DatabaseConfig) -> Result<Self, ServiceError> {
        let db = models::db::connect_with_config(cfg).await.map_err(ServiceError::db)?;
        if cfg.run_migrations {
            migration::Migrator::up(&db, None).await.map_err(ServiceError::db)?;
            info!("document migrations applied");
        }
        Ok(Self::new(db))
    }
}

fn into_document(body: Value) -> Option<Document> {
    match body {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, collection: Collection, doc: Document) -> Result<(), ServiceError> {
        let doc_id = document::id_of(&doc)
            .ok_or_else(|| ServiceError::Db(format!("document for {collection} has no string id")))?
            .to_string();
        let created_at = document::created_at_of(&doc).unwrap_or_else(Utc::now);
        let am = stored_document::ActiveModel {
            pk: Set(Uuid::new_v4()),
            collection: Set(collection.as_str().to_string()),
            doc_id: Set(doc_id),
            body: Set(Value::Object(doc)),
            created_at: Set(created_at.into()),
        };
        am.insert(&self.db).await.map_err(ServiceError::db)?;
        Ok(())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>, ServiceError> {
        let rows = stored_document::Entity::find()
            .filter(stored_document::Column::Collection.eq(collection.as_str()))
            .order_by_desc(stored_document::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(ServiceError::db)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let pk = row.pk;
                let doc = into_document(row.body);
                if doc.is_none() {
                    warn!(%collection, %pk, "skipping non-object document body");
                }
                doc
            })
            .collect())
    }

    async fn find_one_and_update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: Document,
    ) -> Result<Option<Document>, ServiceError> {
        let values: [sea_orm::Value; 3] = [
            collection.as_str().into(),
            filter.to_json().into(),
            Value::Object(patch).into(),
        ];
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Postgres, UPDATE_ONE_SQL, values);
        let row = self.db.query_one(stmt).await.map_err(ServiceError::db)?;
        match row {
            Some(row) => {
                let body: Value = row.try_get("", "body").map_err(ServiceError::db)?;
                Ok(into_document(body))
            }
            None => Ok(None),
        }
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<u64, ServiceError> {
        let values: [sea_orm::Value; 2] = [collection.as_str().into(), filter.to_json().into()];
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Postgres, DELETE_ONE_SQL, values);
        let res = self.db.execute(stmt).await.map_err(ServiceError::db)?;
        Ok(res.rows_affected())
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.db.clone().close().await.map_err(ServiceError::db)?;
        info!("database pool closed");
        Ok(())
    }
}
