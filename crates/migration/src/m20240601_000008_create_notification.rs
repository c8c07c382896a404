//! Create `notifications` table.
//!
//! `related_id` points at the triggering row (e.g. a message) and carries no FK
//! because the target table depends on `type`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk_auto(Notifications::Id))
                    .col(integer(Notifications::UserId).not_null())
                    .col(string_len(Notifications::Type, 32).not_null())
                    .col(text(Notifications::Content).not_null())
                    .col(integer_null(Notifications::RelatedId))
                    .col(boolean(Notifications::IsRead).not_null().default(false))
                    .col(timestamp_with_time_zone(Notifications::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_user")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Notifications::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Notifications { Table, Id, UserId, Type, Content, RelatedId, IsRead, CreatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
