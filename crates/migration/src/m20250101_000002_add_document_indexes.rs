//! Listing index: every list endpoint reads one collection newest first.
use sea_orm_migration::prelude::*;

use crate::m20250101_000001_create_document::Document;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_document_collection_created_at")
                    .table(Document::Table)
                    .col(Document::Collection)
                    .col((Document::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_document_collection_created_at")
                    .table(Document::Table)
                    .to_owned(),
            )
            .await
    }
}
