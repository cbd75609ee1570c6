//! Create `message` table with FK to `translation`.
//!
//! Message ids are only unique inside their translation, so the primary key is
//! `(translation_id, id)`; upserts target that pair.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(uuid(Message::TranslationId).not_null())
                    .col(string_len(Message::Id, 512).not_null())
                    .col(text(Message::Message).not_null())
                    .col(text(Message::Description).not_null())
                    .col(text(Message::Positions).not_null())
                    .col(string_len(Message::Status, 32).not_null())
                    .col(integer(Message::Ordinal).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_message")
                            .col(Message::TranslationId)
                            .col(Message::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_translation")
                            .from(Message::Table, Message::TranslationId)
                            .to(Translation::Table, Translation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Message::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Message { Table, TranslationId, Id, Message, Description, Positions, Status, Ordinal }

#[derive(DeriveIden)]
enum Translation { Table, Id }
