//! Create `business_comments` table. `rating` is optional (1..=5).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessComments::Table)
                    .if_not_exists()
                    .col(pk_auto(BusinessComments::Id))
                    .col(integer(BusinessComments::BusinessId).not_null())
                    .col(integer(BusinessComments::UserId).not_null())
                    .col(text(BusinessComments::Content).not_null())
                    .col(integer_null(BusinessComments::Rating))
                    .col(timestamp_with_time_zone(BusinessComments::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_comment_business")
                            .from(BusinessComments::Table, BusinessComments::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_business_comment_user")
                            .from(BusinessComments::Table, BusinessComments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(BusinessComments::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum BusinessComments { Table, Id, BusinessId, UserId, Content, Rating, CreatedAt }

#[derive(DeriveIden)]
enum Businesses { Table, Id }

#[derive(DeriveIden)]
enum Users { Table, Id }
