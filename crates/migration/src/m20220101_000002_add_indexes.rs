use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Message: loads walk a translation's messages in insertion order
        manager
            .create_index(
                Index::create()
                    .name("idx_message_translation_ordinal")
                    .table(Message::Table)
                    .col(Message::TranslationId)
                    .col(Message::Ordinal)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_message_translation_ordinal").table(Message::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Message { Table, TranslationId, Ordinal }
