//! Create `businesses` table with FKs to `users` (owner) and `categories`.
//!
//! Rows are never hard-deleted; `is_active = false` marks a removed listing.
//! `subscription_id` is a plain back-reference without FK to avoid a cycle.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(pk_auto(Businesses::Id))
                    .col(string_len(Businesses::Name, 255).not_null())
                    .col(text(Businesses::Description).not_null())
                    .col(integer(Businesses::OwnerId).not_null())
                    .col(integer(Businesses::CategoryId).not_null())
                    .col(string_len(Businesses::Address, 255).not_null())
                    .col(string_len(Businesses::City, 128).not_null())
                    .col(string_len(Businesses::State, 128).not_null())
                    .col(string_len(Businesses::ZipCode, 32).not_null())
                    .col(string_len_null(Businesses::Phone, 64))
                    .col(string_len_null(Businesses::Email, 255))
                    .col(string_len_null(Businesses::Website, 512))
                    .col(string_len_null(Businesses::Image, 1024))
                    .col(integer(Businesses::LikeCount).not_null().default(0))
                    .col(integer(Businesses::CommentCount).not_null().default(0))
                    .col(integer(Businesses::Rating).not_null().default(0))
                    .col(boolean(Businesses::IsVerified).not_null().default(false))
                    .col(boolean(Businesses::IsActive).not_null().default(true))
                    .col(boolean(Businesses::IsPaid).not_null().default(false))
                    .col(string_len(Businesses::Status, 16).not_null().default("pending"))
                    .col(timestamp_with_time_zone(Businesses::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Businesses::UpdatedAt).not_null())
                    .col(integer_null(Businesses::SubscriptionId))
                    .col(timestamp_with_time_zone_null(Businesses::SubscriptionExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_owner")
                            .from(Businesses::Table, Businesses::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_category")
                            .from(Businesses::Table, Businesses::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Businesses::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
    Name,
    Description,
    OwnerId,
    CategoryId,
    Address,
    City,
    State,
    ZipCode,
    Phone,
    Email,
    Website,
    Image,
    LikeCount,
    CommentCount,
    Rating,
    IsVerified,
    IsActive,
    IsPaid,
    Status,
    CreatedAt,
    UpdatedAt,
    SubscriptionId,
    SubscriptionExpiresAt,
}

#[derive(DeriveIden)]
enum Users { Table, Id }

#[derive(DeriveIden)]
enum Categories { Table, Id }
