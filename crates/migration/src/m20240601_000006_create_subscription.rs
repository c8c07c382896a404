//! Create `subscriptions` table.
//!
//! One active subscription per business is expected but not enforced here.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(pk_auto(Subscriptions::Id))
                    .col(integer(Subscriptions::BusinessId).not_null())
                    .col(integer(Subscriptions::UserId).not_null())
                    .col(string_len_null(Subscriptions::ExternalOrderId, 128))
                    .col(string_len(Subscriptions::Status, 16).not_null())
                    .col(string_len(Subscriptions::PriceId, 64).not_null())
                    .col(timestamp_with_time_zone_null(Subscriptions::CurrentPeriodStart))
                    .col(timestamp_with_time_zone_null(Subscriptions::CurrentPeriodEnd))
                    .col(timestamp_with_time_zone(Subscriptions::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_business")
                            .from(Subscriptions::Table, Subscriptions::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_user")
                            .from(Subscriptions::Table, Subscriptions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subscriptions::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subscriptions {
    Table,
    Id,
    BusinessId,
    UserId,
    ExternalOrderId,
    Status,
    PriceId,
    CurrentPeriodStart,
    CurrentPeriodEnd,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Businesses { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
