//! Create `translation` table with FK to `service`.
//!
//! One row per (service, language); deleting the service cascades.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Translation::Table)
                    .if_not_exists()
                    .col(uuid(Translation::Id).primary_key())
                    .col(uuid(Translation::ServiceId).not_null())
                    .col(string_len(Translation::Language, 64).not_null())
                    .col(boolean(Translation::Original).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_translation_service")
                            .from(Translation::Table, Translation::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One translation per service and language
        manager
            .create_index(
                Index::create()
                    .name("idx_translation_service_language")
                    .table(Translation::Table)
                    .col(Translation::ServiceId)
                    .col(Translation::Language)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Translation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Translation { Table, Id, ServiceId, Language, Original }

#[derive(DeriveIden)]
enum Service { Table, Id }
