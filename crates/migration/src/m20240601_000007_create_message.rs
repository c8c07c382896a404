//! Create `messages` table. A conversation is scoped to one business.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(pk_auto(Messages::Id))
                    .col(integer(Messages::SenderId).not_null())
                    .col(integer(Messages::ReceiverId).not_null())
                    .col(integer(Messages::BusinessId).not_null())
                    .col(text(Messages::Content).not_null())
                    .col(boolean(Messages::IsRead).not_null().default(false))
                    .col(timestamp_with_time_zone(Messages::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Messages::Table, Messages::SenderId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_receiver")
                            .from(Messages::Table, Messages::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_business")
                            .from(Messages::Table, Messages::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Messages::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Messages { Table, Id, SenderId, ReceiverId, BusinessId, Content, IsRead, CreatedAt }

#[derive(DeriveIden)]
enum Businesses { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
