//! Create `business_likes` table.
//!
//! No unique constraint on (business_id, user_id): the service layer checks
//! for an existing like before inserting.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessLikes::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessLikes::Id))
                    .col(integer(BusinessLikes::BusinessId).not_null())
                    .col(integer(BusinessLikes::UserId).not_null())
                    .col(timestamp_with_time_zone(BusinessLikes::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_like_business")
                            .from(BusinessLikes::Table, BusinessLikes::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_like_user")
                            .from(BusinessLikes::Table, BusinessLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BusinessLikes::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BusinessLikes { Table, Id, BusinessId, UserId, CreatedAt }

#[derive(DeriveIden)]
enum Businesses { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
