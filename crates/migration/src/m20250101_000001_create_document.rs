//! Create `document` table.
//! One row per stored document; `body` holds the JSON document exactly as the
//! application wrote it, `doc_id` mirrors `body->>'id'`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(uuid(Document::Pk).primary_key())
                    .col(string_len(Document::Collection, 64).not_null())
                    .col(string_len(Document::DocId, 128).not_null())
                    .col(json_binary(Document::Body).not_null())
                    .col(timestamp_with_time_zone(Document::CreatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        // Application ids are unique per collection
        manager
            .create_index(
                Index::create()
                    .name("idx_document_collection_doc_id")
                    .table(Document::Table)
                    .col(Document::Collection)
                    .col(Document::DocId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Document::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Document {
    Table,
    Pk,
    Collection,
    DocId,
    Body,
    CreatedAt,
}
